//! Utils to define the time at which a certification path is validated

use core::{cmp::Ordering, fmt, time::Duration};

use serde::{
    de::{self, Deserializer, Visitor},
    ser::Serializer,
    Deserialize, Serialize,
};

/// Time of interest for the validation of a certification path. Serialized as seconds since the
/// Unix epoch.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct TimeOfInterest(pub der::DateTime);

impl fmt::Display for TimeOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<der::DateTime> for TimeOfInterest {
    fn from(dt: der::DateTime) -> Self {
        TimeOfInterest(dt)
    }
}

impl TimeOfInterest {
    /// Create a [`TimeOfInterest`] from Unix epoch
    pub fn from_unix_secs(v: u64) -> der::Result<Self> {
        Ok(Self(der::DateTime::from_unix_duration(
            Duration::from_secs(v),
        )?))
    }

    /// Return Unix epoch (in seconds) for this value
    pub fn as_unix_secs(&self) -> u64 {
        self.0.unix_duration().as_secs()
    }

    /// Creates a [`TimeOfInterest`] for the current instant
    #[cfg(feature = "std")]
    pub fn now() -> der::Result<Self> {
        Ok(Self(der::DateTime::from_system_time(
            std::time::SystemTime::now(),
        )?))
    }
}

impl PartialEq<x509_cert::time::Time> for TimeOfInterest {
    fn eq(&self, other: &x509_cert::time::Time) -> bool {
        self.0.eq(&other.to_date_time())
    }
}

impl PartialOrd<x509_cert::time::Time> for TimeOfInterest {
    fn partial_cmp(&self, other: &x509_cert::time::Time) -> Option<Ordering> {
        self.0.partial_cmp(&other.to_date_time())
    }
}

impl Serialize for TimeOfInterest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.as_unix_secs())
    }
}

impl<'de> Deserialize<'de> for TimeOfInterest {
    fn deserialize<D>(deserializer: D) -> Result<TimeOfInterest, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ToiVisitor;

        impl<'de> Visitor<'de> for ToiVisitor {
            type Value = TimeOfInterest;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("seconds since the Unix epoch")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                TimeOfInterest::from_unix_secs(value)
                    .map_err(|_| E::custom(alloc::format!("time of interest out of range: {value}")))
            }
        }

        deserializer.deserialize_u64(ToiVisitor)
    }
}

#[test]
fn time_of_interest_test() {
    let toi = TimeOfInterest::from_unix_secs(1_700_000_000).unwrap();
    assert_eq!(toi.as_unix_secs(), 1_700_000_000);
    let later = TimeOfInterest::from_unix_secs(1_700_000_001).unwrap();
    assert!(toi < later);
    assert!(TimeOfInterest::from_unix_secs(u64::MAX).is_err());
}
