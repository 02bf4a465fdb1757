//! Depth-first certification path development with per-candidate validation and backtracking.
//!
//! The end entity certificate and the deduplicated intermediates are held in an arena and referenced
//! by index, with the end entity certificate at index 0. A partial path is a list of arena indices.
//! Trust anchors are never pushed onto the partial path; an anchor whose subject matches the issuer
//! of the last certificate closes the path once that certificate's signature verifies under the
//! anchor's key and the checks that depend on the whole path pass.

use alloc::format;
use alloc::vec::Vec;

use log::{debug, info};

use crate::{
    environment::pki_environment::PkiEnvironment,
    extension_policy::ExtensionPolicy,
    name_constraints_set::NameConstraintsSet,
    pdv_certificate::PDVCertificate,
    policy::Policy,
    util::error::*,
    util::logging::*,
    util::pdv_utilities::{compare_names, log_debug_for_ca, name_to_string},
    Store, TrustAnchor, VerifiedPath,
};

/// Index of the end entity certificate in the arena
const LEAF: usize = 0;

/// State for one path search
pub(crate) struct PathBuilder<'a> {
    pe: &'a PkiEnvironment,
    policy: &'a Policy,
    ca_extension_policy: &'a ExtensionPolicy,
    store: &'a Store,
    arena: Vec<&'a PDVCertificate>,
    signature_checks: usize,
    candidates_examined: usize,
    /// Failure recorded at the greatest partial path length, reported if the search is exhausted
    deepest_failure: Option<(usize, Error)>,
}

impl<'a> PathBuilder<'a> {
    pub(crate) fn new(
        pe: &'a PkiEnvironment,
        policy: &'a Policy,
        ca_extension_policy: &'a ExtensionPolicy,
        store: &'a Store,
        leaf: &'a PDVCertificate,
        intermediates: &'a [PDVCertificate],
    ) -> PathBuilder<'a> {
        let mut arena: Vec<&'a PDVCertificate> = Vec::with_capacity(intermediates.len() + 1);
        arena.push(leaf);
        for ca in intermediates {
            if !arena.iter().any(|c| c.encoded_cert == ca.encoded_cert) {
                arena.push(ca);
            }
        }
        PathBuilder {
            pe,
            policy,
            ca_extension_policy,
            store,
            arena,
            signature_checks: 0,
            candidates_examined: 0,
            deepest_failure: None,
        }
    }

    /// Runs the checks that concern only the end entity certificate and then searches for a path.
    pub(crate) fn build(mut self, ee_extension_policy: &ExtensionPolicy) -> Result<VerifiedPath> {
        let leaf = self.arena[LEAF];
        if let Err(e) = self.check_leaf(leaf, ee_extension_policy) {
            log_message(
                &PeLogLevels::PeInfo,
                format!(
                    "End entity certificate {} rejected: {}",
                    name_to_string(leaf.subject()),
                    e
                )
                .as_str(),
            );
            return Err(e);
        }

        let mut path = Vec::with_capacity(self.policy.max_chain_depth as usize + 1);
        path.push(LEAF);
        match self.search(&mut path, 0)? {
            Some(verified) => {
                info!(
                    "Found path of length {} for {} terminating at {}",
                    verified.len(),
                    name_to_string(leaf.subject()),
                    name_to_string(verified.trust_anchor.subject())
                );
                Ok(verified)
            }
            None => {
                let e = match self.deepest_failure.take() {
                    Some((_, e)) => e,
                    None => Error::failure(
                        PathValidationStatus::NoPathsFound,
                        format!("no issuer found for {}", name_to_string(leaf.subject())),
                    ),
                };
                log_message(
                    &PeLogLevels::PeInfo,
                    format!(
                        "No valid path found for {}: {}",
                        name_to_string(leaf.subject()),
                        e
                    )
                    .as_str(),
                );
                Err(e)
            }
        }
    }

    fn check_leaf(&self, leaf: &PDVCertificate, ee_extension_policy: &ExtensionPolicy) -> Result<()> {
        self.policy.permits_basic(leaf)?;
        self.policy.permits_algorithms(leaf)?;
        ee_extension_policy.permits(self.policy, leaf)?;
        self.policy.permits_ee(leaf)
    }

    fn record_failure(&mut self, path_len: usize, e: Error) {
        let deeper = match &self.deepest_failure {
            Some((len, _)) => path_len > *len,
            None => true,
        };
        if deeper {
            self.deepest_failure = Some((path_len, e));
        }
    }

    fn count_candidate(&mut self) -> Result<()> {
        if self.candidates_examined >= self.policy.limits.max_candidates {
            return Err(Error::failure(
                PathValidationStatus::PathBuildingBudgetExceeded,
                format!(
                    "examined {} prospective issuers without finding a path",
                    self.candidates_examined
                ),
            ));
        }
        self.candidates_examined += 1;
        Ok(())
    }

    /// Verifies the signature on `cert` using `issuer_key`. The outer Result is an exhausted budget,
    /// which ends the search; the inner Result is the outcome of the verification.
    fn verify_signature(
        &mut self,
        cert: &PDVCertificate,
        issuer_key: &spki::SubjectPublicKeyInfoOwned,
    ) -> Result<Result<()>> {
        if self.signature_checks >= self.policy.limits.max_signature_checks {
            return Err(Error::failure(
                PathValidationStatus::PathBuildingBudgetExceeded,
                format!(
                    "performed {} signature verifications without finding a path",
                    self.signature_checks
                ),
            ));
        }
        self.signature_checks += 1;
        Ok(self
            .pe
            .verify_signature_message(
                cert.tbs_bytes(),
                cert.signature().raw_bytes(),
                cert.signature_algorithm(),
                issuer_key,
            )
            .map_err(|e| match e {
                Error::VerificationFailure(_) => Error::failure(
                    PathValidationStatus::SignatureVerificationFailure,
                    format!(
                        "signature on {} does not verify: {}",
                        name_to_string(cert.subject()),
                        e
                    ),
                ),
                other => other,
            }))
    }

    /// `search` extends `path`, whose intermediates include `depth` non-self-issued certificates.
    /// Returns Ok(None) when every alternative below `path` is exhausted and an error only when the
    /// work budget runs out.
    fn search(&mut self, path: &mut Vec<usize>, depth: u8) -> Result<Option<VerifiedPath>> {
        let current = self.arena[path[path.len() - 1]];
        let mut issuer_found = false;

        let store = self.store;
        for ta in store.get_trust_anchors_by_name(current.issuer()) {
            issuer_found = true;
            self.count_candidate()?;
            if let Err(e) = self.verify_signature(current, ta.public_key())? {
                debug!(
                    "Trust anchor {} did not verify {}: {}",
                    name_to_string(ta.subject()),
                    name_to_string(current.subject()),
                    e
                );
                self.record_failure(path.len(), e);
                continue;
            }
            match self.check_whole_path(path, ta) {
                Ok(()) => {
                    let certificates = path.iter().map(|i| self.arena[*i].clone()).collect();
                    return Ok(Some(VerifiedPath::new(certificates, ta.clone())));
                }
                Err(e) => {
                    debug!(
                        "Path terminating at {} rejected: {}",
                        name_to_string(ta.subject()),
                        e
                    );
                    self.record_failure(path.len(), e);
                }
            }
        }

        for index in 1..self.arena.len() {
            let candidate = self.arena[index];
            if !compare_names(candidate.subject(), current.issuer()) {
                continue;
            }
            if path
                .iter()
                .any(|i| self.arena[*i].encoded_cert == candidate.encoded_cert)
            {
                continue;
            }
            issuer_found = true;
            self.count_candidate()?;

            let next_depth = match self.check_candidate(candidate, depth) {
                Ok(next_depth) => next_depth,
                Err(e) => {
                    log_debug_for_ca(candidate, format!("{}", e).as_str());
                    self.record_failure(path.len(), e);
                    continue;
                }
            };
            if let Err(e) = self.verify_signature(current, candidate.public_key())? {
                log_debug_for_ca(candidate, format!("{}", e).as_str());
                self.record_failure(path.len(), e);
                continue;
            }

            path.push(index);
            if let Some(verified) = self.search(path, next_depth)? {
                return Ok(Some(verified));
            }
            path.pop();
        }

        if !issuer_found {
            self.record_failure(
                path.len(),
                Error::failure(
                    PathValidationStatus::NoPathsFound,
                    format!("no issuer found for {}", name_to_string(current.subject())),
                ),
            );
        }
        Ok(None)
    }

    /// Checks a prospective issuer that has `depth` non-self-issued intermediates below it and
    /// returns the depth to use when searching for its own issuer.
    fn check_candidate(&self, candidate: &PDVCertificate, depth: u8) -> Result<u8> {
        self.policy.permits_basic(candidate)?;
        self.policy.permits_algorithms(candidate)?;
        self.policy.permits_ca(candidate, depth)?;

        let next_depth = if candidate.is_self_issued() {
            depth
        } else {
            depth.saturating_add(1)
        };
        if next_depth > self.policy.max_chain_depth {
            return Err(Error::failure(
                PathValidationStatus::InvalidPathLength,
                format!(
                    "path would include {} intermediates, more than the maximum of {}",
                    next_depth, self.policy.max_chain_depth
                ),
            ));
        }

        self.ca_extension_policy.permits(self.policy, candidate)?;
        Ok(next_depth)
    }

    /// Checks that depend on the complete path: RSA key sizes, including the trust anchor's key, and
    /// name constraints asserted by the trust anchor or any intermediate.
    fn check_whole_path(&self, path: &[usize], ta: &TrustAnchor) -> Result<()> {
        for i in path {
            self.policy.permits_key_size(self.arena[*i].public_key())?;
        }
        self.policy.permits_key_size(ta.public_key())?;

        let leaf = self.arena[LEAF];
        if let Some(san) = leaf.subject_alt_name() {
            let constraints = path[1..]
                .iter()
                .filter_map(|i| self.arena[*i].name_constraints())
                .chain(ta.name_constraints());
            for nc in constraints {
                NameConstraintsSet::from_name_constraints(nc).san_within_subtrees(san)?;
            }
        }
        Ok(())
    }
}
