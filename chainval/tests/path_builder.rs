mod common;

use chainval::*;
use common::*;
use const_oid::db::rfc5912::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_KEY_USAGE,
    ID_CE_SUBJECT_KEY_IDENTIFIER,
};

const ROOT: &str = "CN=Root,O=Test";
const INTERMEDIATE: &str = "CN=Intermediate,O=Test";

fn status(r: &Result<VerifiedPath>) -> Option<PathValidationStatus> {
    r.as_ref().err().and_then(|e| e.status())
}

/// Root (key 1) issues Intermediate (key 2), which issues the leaf (key 3)
fn three_tier() -> (TestCert, TestCert, TestCert) {
    (
        TestCert::root(ROOT, 1),
        TestCert::ca(INTERMEDIATE, 2, ROOT, 1),
        TestCert::leaf("example.com", 3, INTERMEDIATE, 2),
    )
}

#[test]
fn anchor_intermediate_leaf() {
    let (root, ca, leaf) = three_tier();
    let leaf = leaf.build();
    let ca = ca.build();
    let b = builder(store(&[&root]));

    let verifier = b
        .max_chain_depth(1)
        .build_server_verifier(dns_subject("example.com"))
        .unwrap();
    let path = verifier.verify(&leaf, &[ca.clone()]).unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path.leaf(), &leaf);
    assert_eq!(path.intermediates(), &[ca.clone()]);
    assert_eq!(path.trust_anchor.certificate(), &root.build());

    let verifier = b
        .max_chain_depth(0)
        .build_server_verifier(dns_subject("example.com"))
        .unwrap();
    let r = verifier.verify(&leaf, &[ca]);
    assert_eq!(status(&r), Some(PathValidationStatus::InvalidPathLength));
}

#[test]
fn leaf_issued_by_anchor() {
    let root = TestCert::root(ROOT, 1);
    let leaf = TestCert::leaf("example.com", 3, ROOT, 1).build();
    let verifier = builder(store(&[&root]))
        .max_chain_depth(0)
        .build_server_verifier(dns_subject("example.com"))
        .unwrap();
    let path = verifier.verify(&leaf, &[]).unwrap();
    assert_eq!(path.len(), 1);
    assert!(path.intermediates().is_empty());
}

#[test]
fn max_chain_depth_boundary() {
    // Root -> CA 1 -> CA 2 -> CA 3 -> leaf
    let root = TestCert::root(ROOT, 1);
    let ca1 = TestCert::ca("CN=CA 1", 11, ROOT, 1).build();
    let ca2 = TestCert::ca("CN=CA 2", 12, "CN=CA 1", 11).build();
    let ca3 = TestCert::ca("CN=CA 3", 13, "CN=CA 2", 12).build();
    let leaf = TestCert::leaf("example.com", 3, "CN=CA 3", 13).build();
    let intermediates = [ca3.clone(), ca1.clone(), ca2.clone()];
    let b = builder(store(&[&root]));

    let path = b
        .max_chain_depth(3)
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &intermediates)
        .unwrap();
    assert_eq!(path.certificates, vec![leaf.clone(), ca3, ca2, ca1]);

    let r = b
        .max_chain_depth(2)
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &intermediates);
    assert_eq!(status(&r), Some(PathValidationStatus::InvalidPathLength));
}

#[test]
fn self_issued_intermediate_does_not_count() {
    // Intermediate rolls over from key 2 to key 5 using a self-issued certificate
    let (root, ca, _) = three_tier();
    let rollover = TestCert::ca(INTERMEDIATE, 5, INTERMEDIATE, 2);
    let leaf = TestCert::leaf("example.com", 3, INTERMEDIATE, 5).build();
    let ca = ca.with_extension(bc_ext(true, Some(0), true)).build();
    let rollover = rollover.build();
    assert!(rollover.is_self_issued());

    let verifier = builder(store(&[&root]))
        .max_chain_depth(1)
        .build_server_verifier(dns_subject("example.com"))
        .unwrap();
    let path = verifier.verify(&leaf, &[ca.clone(), rollover.clone()]).unwrap();
    assert_eq!(path.certificates, vec![leaf.clone(), rollover, ca]);

    // the same chain without the rollover certificate has the same outcome
    let (_, ca, leaf) = three_tier();
    let ca = ca.with_extension(bc_ext(true, Some(0), true)).build();
    assert!(verifier.verify(&leaf.build(), &[ca]).is_ok());
}

#[test]
fn path_len_constraint() {
    let root = TestCert::root(ROOT, 1);
    let ca1 = TestCert::ca("CN=CA 1", 11, ROOT, 1)
        .with_extension(bc_ext(true, Some(0), true))
        .build();
    let ca2 = TestCert::ca("CN=CA 2", 12, "CN=CA 1", 11).build();
    let leaf = TestCert::leaf("example.com", 3, "CN=CA 2", 12).build();
    let r = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca1, ca2]);
    assert_eq!(status(&r), Some(PathValidationStatus::InvalidPathLength));
}

#[test]
fn backtracks_past_expired_intermediate() {
    let (root, ca, leaf) = three_tier();
    let mut expired = ca.clone();
    expired.serial = vec![0x7F];
    expired.not_after = NOW - 1000;
    let expired = expired.build();
    let ca = ca.build();

    let path = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[expired, ca.clone()])
        .unwrap();
    assert_eq!(path.intermediates(), &[ca]);
}

#[test]
fn backtracks_from_dead_end() {
    // Two intermediates share a subject and key. The first was issued by an unknown CA.
    let (root, ca, leaf) = three_tier();
    let dead_end = TestCert::ca(INTERMEDIATE, 2, "CN=Unknown", 9).build();
    let ca = ca.build();

    let path = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[dead_end, ca.clone()])
        .unwrap();
    assert_eq!(path.intermediates(), &[ca]);
}

#[test]
fn bad_signature_rejected() {
    let (root, ca, mut leaf) = three_tier();
    leaf.corrupt_signature = true;
    let r = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[ca.build()]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::SignatureVerificationFailure)
    );

    // an anchor with the right name but the wrong key does not close the path
    let (_, ca, leaf) = three_tier();
    let imposter = TestCert::root(ROOT, 7);
    let r = builder(store(&[&imposter]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[ca.build()]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::SignatureVerificationFailure)
    );
}

#[test]
fn cycles_terminate() {
    let root = TestCert::root(ROOT, 1);
    let c1 = TestCert::ca("CN=C1", 21, "CN=C2", 22).build();
    let c2 = TestCert::ca("CN=C2", 22, "CN=C1", 21).build();
    let leaf = TestCert::leaf("example.com", 3, "CN=C1", 21).build();
    let r = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[c1.clone(), c2, c1]);
    assert_eq!(status(&r), Some(PathValidationStatus::NoPathsFound));
}

#[test]
fn no_issuer() {
    let root = TestCert::root(ROOT, 1);
    let leaf = TestCert::leaf("example.com", 3, "CN=Elsewhere", 4).build();
    let r = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[]);
    assert_eq!(status(&r), Some(PathValidationStatus::NoPathsFound));
}

#[test]
fn budget_exhaustion() {
    let (root, ca, leaf) = three_tier();
    let leaf = leaf.build();
    let ca = ca.build();
    let b = builder(store(&[&root]));

    let r = b
        .limits(PathBuildingLimits {
            max_signature_checks: 1,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        })
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca.clone()]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::PathBuildingBudgetExceeded)
    );

    let r = b
        .limits(PathBuildingLimits {
            max_signature_checks: DEFAULT_MAX_SIGNATURE_CHECKS,
            max_candidates: 1,
        })
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca.clone()]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::PathBuildingBudgetExceeded)
    );

    let r = b
        .limits(PathBuildingLimits {
            max_signature_checks: 2,
            max_candidates: 2,
        })
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca]);
    assert!(r.is_ok());
}

#[test]
fn many_false_leads_are_bounded() {
    // Forty intermediates with the right name and key but unknown issuers, each of which leads
    // nowhere, followed by the real intermediate
    let (root, ca, leaf) = three_tier();
    let mut intermediates: Vec<PDVCertificate> = (0..40u8)
        .map(|i| TestCert::ca(INTERMEDIATE, 2, &format!("CN=Decoy {}", i), 30 + i).build())
        .collect();
    intermediates.push(ca.build());
    let leaf = leaf.build();
    let b = builder(store(&[&root]));

    let r = b
        .limits(PathBuildingLimits {
            max_signature_checks: 10,
            max_candidates: 1024,
        })
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &intermediates);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::PathBuildingBudgetExceeded)
    );

    let r = b
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &intermediates);
    assert!(r.is_ok());
}

#[test]
fn ca_missing_required_extension() {
    let (root, ca, leaf) = three_tier();
    let ca = ca.without_extension(ID_CE_KEY_USAGE).build();
    let leaf = leaf.build();
    let b = builder(store(&[&root]));

    let r = b
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca.clone()]);
    match r {
        Err(Error::VerificationFailure(vf)) => {
            assert_eq!(vf.status, PathValidationStatus::ExtensionPolicyViolation);
            assert_eq!(vf.oid, Some(ID_CE_KEY_USAGE));
        }
        _ => panic!("expected an extension policy violation"),
    }

    let path = b
        .ca_extension_policy(ExtensionPolicy::permit_all())
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca]);
    assert!(path.is_ok());
}

#[test]
fn ca_basic_constraints_checks() {
    let (root, ca, leaf) = three_tier();
    let leaf = leaf.build();
    let b = builder(store(&[&root]));
    let verifier = b
        .build_server_verifier(dns_subject("example.com"))
        .unwrap();

    // basicConstraints must be critical under the default CA rules
    let noncritical = ca.clone().with_extension(bc_ext(true, None, false)).build();
    let r = verifier.verify(&leaf, &[noncritical.clone()]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::ExtensionPolicyViolation)
    );
    let relaxed = b
        .ca_extension_policy(ExtensionPolicy::permit_all())
        .build_server_verifier(dns_subject("example.com"))
        .unwrap();
    assert!(relaxed.verify(&leaf, &[noncritical]).is_ok());

    // a CA certificate must assert cA whatever the extension policy
    let not_ca = ca.clone().with_extension(bc_ext(false, None, true)).build();
    let r = relaxed.verify(&leaf, &[not_ca]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::InvalidBasicConstraints)
    );

    let missing = ca.without_extension(ID_CE_BASIC_CONSTRAINTS).build();
    let r = relaxed.verify(&leaf, &[missing]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::MissingBasicConstraints)
    );
}

#[test]
fn ca_key_usage_requires_cert_sign() {
    use x509_cert::ext::pkix::{KeyUsage, KeyUsages};

    let (root, ca, leaf) = three_tier();
    let ca = ca
        .with_extension(ku_ext(KeyUsage(KeyUsages::DigitalSignature.into()), true))
        .build();
    let r = builder(store(&[&root]))
        .ca_extension_policy(ExtensionPolicy::permit_all())
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[ca]);
    assert_eq!(status(&r), Some(PathValidationStatus::InvalidKeyUsage));
}

#[test]
fn criticality_mismatch() {
    let (root, ca, leaf) = three_tier();
    let mut critical_ski = ski_ext(2);
    critical_ski.critical = true;
    let ca = ca.with_extension(critical_ski).build();
    let leaf = leaf.build();
    let b = builder(store(&[&root]));

    let noncritical = ExtensionPolicyBuilder::new()
        .maybe_present(ID_CE_SUBJECT_KEY_IDENTIFIER, Criticality::NonCritical, None)
        .unwrap()
        .build();
    let r = b
        .ca_extension_policy(noncritical)
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca.clone()]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::ExtensionPolicyViolation)
    );

    let agnostic = ExtensionPolicyBuilder::new()
        .maybe_present(ID_CE_SUBJECT_KEY_IDENTIFIER, Criticality::Agnostic, None)
        .unwrap()
        .build();
    let r = b
        .ca_extension_policy(agnostic)
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca]);
    assert!(r.is_ok());
}

#[test]
fn custom_validator_failure_backtracks() {
    use std::sync::Arc;
    use x509_cert::ext::Extension;

    // reject CA certificates whose subject key identifier ends in 2
    let validator: ValidatorRef = Arc::new(
        |_: &Policy, _: &PDVCertificate, ext: Option<&Extension>| -> Result<()> {
            match ext {
                Some(e) if e.extn_value.as_bytes().last() == Some(&2) => Err(Error::failure(
                    PathValidationStatus::ExtensionPolicyViolation,
                    "key identifier not accepted",
                )),
                _ => Ok(()),
            }
        },
    );
    let policy = ExtensionPolicyBuilder::new()
        .must_be_present(
            ID_CE_SUBJECT_KEY_IDENTIFIER,
            Criticality::NonCritical,
            Some(validator),
        )
        .unwrap()
        .build();

    let (root, ca, leaf) = three_tier();
    let r = builder(store(&[&root]))
        .ca_extension_policy(policy)
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[ca.build()]);
    match r {
        Err(Error::VerificationFailure(vf)) => {
            assert_eq!(vf.status, PathValidationStatus::ExtensionPolicyViolation);
            assert_eq!(vf.oid, Some(ID_CE_SUBJECT_KEY_IDENTIFIER));
        }
        _ => panic!("expected the validator to reject the intermediate"),
    }
}

#[test]
fn ee_extension_policy() {
    let (root, ca, leaf) = three_tier();
    let leaf = leaf.without_extension(ID_CE_AUTHORITY_KEY_IDENTIFIER).build();
    let ca = ca.build();
    let b = builder(store(&[&root]));

    let r = b
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca.clone()]);
    match r {
        Err(Error::VerificationFailure(vf)) => {
            assert_eq!(vf.status, PathValidationStatus::ExtensionPolicyViolation);
            assert_eq!(vf.oid, Some(ID_CE_AUTHORITY_KEY_IDENTIFIER));
        }
        _ => panic!("expected an extension policy violation"),
    }

    let r = b
        .ee_extension_policy(ExtensionPolicy::permit_all())
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca]);
    assert!(r.is_ok());
}

#[test]
fn end_entity_asserting_ca_rejected() {
    let (root, ca, leaf) = three_tier();
    let leaf = leaf.with_extension(bc_ext(true, None, true)).build();
    let r = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca.build()]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::ExtensionPolicyViolation)
    );
}

#[test]
fn subject_matching() {
    let (root, ca, leaf) = three_tier();
    let leaf = leaf.build();
    let ca = ca.build();
    let b = builder(store(&[&root]));

    assert!(b
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca.clone()])
        .is_ok());
    assert!(b
        .build_server_verifier(dns_subject("EXAMPLE.com"))
        .unwrap()
        .verify(&leaf, &[ca.clone()])
        .is_ok());
    let r = b
        .build_server_verifier(dns_subject("other.com"))
        .unwrap()
        .verify(&leaf, &[ca.clone()]);
    assert_eq!(status(&r), Some(PathValidationStatus::SubjectMismatch));

    let wildcard = TestCert::leaf("example.com", 3, INTERMEDIATE, 2)
        .with_extension(san_ext(vec![dns("*.example.com")], false))
        .build();
    let verifier = b
        .build_server_verifier(dns_subject("www.example.com"))
        .unwrap();
    assert!(verifier.verify(&wildcard, &[ca.clone()]).is_ok());
    let r = b
        .build_server_verifier(dns_subject("a.b.example.com"))
        .unwrap()
        .verify(&wildcard, &[ca.clone()]);
    assert_eq!(status(&r), Some(PathValidationStatus::SubjectMismatch));

    let ip_leaf = TestCert::leaf("example.com", 3, INTERMEDIATE, 2)
        .with_extension(san_ext(vec![ip(&[192, 0, 2, 7])], false))
        .build();
    let addr = |o: [u8; 4]| Subject::Ip(IpAddress::from_bytes(&o).unwrap());
    assert!(b
        .build_server_verifier(addr([192, 0, 2, 7]))
        .unwrap()
        .verify(&ip_leaf, &[ca.clone()])
        .is_ok());
    let r = b
        .build_server_verifier(addr([192, 0, 2, 8]))
        .unwrap()
        .verify(&ip_leaf, &[ca]);
    assert_eq!(status(&r), Some(PathValidationStatus::SubjectMismatch));
}

#[test]
fn extended_key_usage() {
    let (root, ca, leaf) = three_tier();
    let ca = ca.build();
    let b = builder(store(&[&root]));
    let server_only = leaf
        .clone()
        .with_extension(eku_ext(&[EKU_SERVER_AUTH]))
        .build();

    assert!(b
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&server_only, &[ca.clone()])
        .is_ok());
    let r = b
        .build_client_verifier()
        .unwrap()
        .verify(&server_only, &[ca.clone()]);
    assert_eq!(
        r.err().and_then(|e| e.status()),
        Some(PathValidationStatus::InvalidExtendedKeyUsage)
    );

    let any = leaf.clone().with_extension(eku_ext(&[EKU_ANY])).build();
    assert!(b.build_client_verifier().unwrap().verify(&any, &[ca.clone()]).is_ok());

    // absence of extKeyUsage permits any purpose
    let none = leaf
        .without_extension(const_oid::db::rfc5912::ID_CE_EXT_KEY_USAGE)
        .build();
    assert!(b.build_client_verifier().unwrap().verify(&none, &[ca]).is_ok());
}

#[test]
fn ca_extended_key_usage_constrains_purpose() {
    let (root, ca, leaf) = three_tier();
    let leaf = leaf.build();
    let b = builder(store(&[&root]));
    let client_ca = ca.clone().with_extension(eku_ext(&[EKU_CLIENT_AUTH])).build();

    let r = b
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[client_ca.clone()]);
    assert_eq!(
        r.err().and_then(|e| e.status()),
        Some(PathValidationStatus::ExtensionPolicyViolation)
    );
    assert!(b
        .build_client_verifier()
        .unwrap()
        .verify(&leaf, &[client_ca.clone()])
        .is_ok());

    // the search moves on to an intermediate that permits the purpose
    let any_ca = ca.clone().with_extension(eku_ext(&[EKU_ANY])).build();
    let path = b
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[client_ca, any_ca.clone()])
        .unwrap();
    assert_eq!(path.intermediates(), &[any_ca]);
}

#[test]
fn expired_leaf_rejected() {
    let (root, ca, mut leaf) = three_tier();
    leaf.not_after = NOW - 1;
    let second_root = TestCert::root(ROOT, 2);
    let r = builder(store(&[&root, &second_root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[ca.build()]);
    assert_eq!(status(&r), Some(PathValidationStatus::InvalidNotAfterDate));

    let (root, ca, mut leaf) = three_tier();
    leaf.not_before = NOW + 1;
    let r = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[ca.build()]);
    assert_eq!(status(&r), Some(PathValidationStatus::InvalidNotBeforeDate));
}

#[test]
fn name_constraints() {
    let root = TestCert::root(ROOT, 1)
        .with_extension(nc_ext(vec![dns("example.com")], vec![dns("bad.example.com")]));
    let ca = TestCert::ca(INTERMEDIATE, 2, ROOT, 1).build();
    let b = builder(store(&[&root]));

    let inside = TestCert::leaf("www.example.com", 3, INTERMEDIATE, 2).build();
    assert!(b
        .build_server_verifier(dns_subject("www.example.com"))
        .unwrap()
        .verify(&inside, &[ca.clone()])
        .is_ok());

    let outside = TestCert::leaf("example.org", 3, INTERMEDIATE, 2).build();
    let r = b
        .build_server_verifier(dns_subject("example.org"))
        .unwrap()
        .verify(&outside, &[ca.clone()]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::NameConstraintsViolation)
    );

    let excluded = TestCert::leaf("x.bad.example.com", 3, INTERMEDIATE, 2).build();
    let r = b
        .build_server_verifier(dns_subject("x.bad.example.com"))
        .unwrap()
        .verify(&excluded, &[ca.clone()]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::NameConstraintsViolation)
    );

    // a wildcard one label below example.com also names bad.example.com
    let wildcard = TestCert::leaf("www.example.com", 3, INTERMEDIATE, 2)
        .with_extension(san_ext(vec![dns("*.example.com")], false))
        .build();
    for name in ["bad.example.com", "www.example.com"] {
        let r = b
            .build_server_verifier(dns_subject(name))
            .unwrap()
            .verify(&wildcard, &[ca.clone()]);
        assert_eq!(
            status(&r),
            Some(PathValidationStatus::NameConstraintsViolation)
        );
    }

    // and is acceptable when every such name is permitted
    let root = TestCert::root(ROOT, 1).with_extension(nc_ext(vec![dns(".example.com")], vec![]));
    assert!(builder(store(&[&root]))
        .build_server_verifier(dns_subject("www.example.com"))
        .unwrap()
        .verify(&wildcard, &[ca])
        .is_ok());

    // constraints asserted by an intermediate apply too
    let root = TestCert::root(ROOT, 1);
    let ca = TestCert::ca(INTERMEDIATE, 2, ROOT, 1)
        .with_extension(nc_ext(vec![ip(&[10, 0, 0, 0, 255, 0, 0, 0])], vec![]))
        .build();
    let ip_leaf = TestCert::leaf("example.com", 3, INTERMEDIATE, 2)
        .with_extension(san_ext(vec![dns("example.com"), ip(&[192, 0, 2, 1])], false))
        .build();
    let r = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&ip_leaf, &[ca]);
    assert_eq!(
        status(&r),
        Some(PathValidationStatus::NameConstraintsViolation)
    );
}

#[test]
fn minimum_rsa_modulus() {
    let (root, ca, mut leaf) = three_tier();
    leaf.key = rsa_key(1024, 3);
    let leaf = leaf.build();
    let ca = ca.build();
    let b = builder(store(&[&root]));

    let r = b
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca.clone()]);
    assert_eq!(status(&r), Some(PathValidationStatus::ProhibitedKeySize));

    assert!(b
        .minimum_rsa_modulus(1024)
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf, &[ca])
        .is_ok());

    // the trust anchor's key is checked as well
    let mut weak_root = TestCert::root(ROOT, 1);
    weak_root.key = rsa_key(1024, 1);
    let mut ca = TestCert::ca(INTERMEDIATE, 2, ROOT, 1);
    ca.issuer_key = rsa_key(1024, 1);
    let (_, _, leaf) = three_tier();
    let r = builder(store(&[&weak_root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[ca.build()]);
    assert_eq!(status(&r), Some(PathValidationStatus::ProhibitedKeySize));
}

#[test]
fn prohibited_algorithm() {
    use der::asn1::ObjectIdentifier;

    let (root, ca, mut leaf) = three_tier();
    // secp256k1 is not a permitted curve
    leaf.key.algorithm.parameters =
        Some(der::Any::encode_from(&ObjectIdentifier::new_unwrap("1.3.132.0.10")).unwrap());
    let r = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[ca.build()]);
    assert_eq!(status(&r), Some(PathValidationStatus::ProhibitedAlg));

    // P-521 keys are not accepted by default
    let (root, ca, mut leaf) = three_tier();
    leaf.key.algorithm.parameters =
        Some(der::Any::encode_from(&ObjectIdentifier::new_unwrap("1.3.132.0.35")).unwrap());
    let r = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap()
        .verify(&leaf.build(), &[ca.build()]);
    assert_eq!(status(&r), Some(PathValidationStatus::ProhibitedAlg));
}

#[test]
fn input_order_decides_between_valid_paths() {
    // Two valid intermediates for the same leaf, differing only in serial number
    let (root, ca, leaf) = three_tier();
    let mut other = ca.clone();
    other.serial = vec![0x42];
    let ca = ca.build();
    let other = other.build();
    let leaf = leaf.build();
    let verifier = builder(store(&[&root]))
        .build_server_verifier(dns_subject("example.com"))
        .unwrap();

    let path = verifier.verify(&leaf, &[other.clone(), ca.clone()]).unwrap();
    assert_eq!(path.intermediates(), &[other.clone()]);
    let path = verifier.verify(&leaf, &[ca.clone(), other]).unwrap();
    assert_eq!(path.intermediates(), &[ca]);
}
