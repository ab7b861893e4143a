use crate::record::TIMEOUT;

/// Outcome of a single probe of a host.
///
/// Both variants carry the resolved address, which is what samples are stored under.
#[derive(Clone, Debug, PartialEq)]
pub enum Probe {
    /// The host replied.
    Reply {
        /// Resolved address of the host
        address: String,

        /// Round-trip time in milliseconds
        elapsed_ms: f64,
    },

    /// No reply arrived in time.
    TimedOut {
        /// Resolved address of the host
        address: String,
    },
}

impl Probe {
    /// The resolved address.
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::Reply { address, .. } | Self::TimedOut { address } => address,
        }
    }

    /// The response time to store, `-1` for a timeout.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn response_time(&self) -> f32 {
        match self {
            Self::Reply { elapsed_ms, .. } => *elapsed_ms as f32,
            Self::TimedOut { .. } => TIMEOUT,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test_log::test]
    fn probe_response_time() {
        let reply = Probe::Reply {
            address: "127.0.0.1".into(),
            elapsed_ms: 0.25,
        };
        assert_eq!("127.0.0.1", reply.address());
        assert_eq!(0.25, reply.response_time());

        let timeout = Probe::TimedOut {
            address: "10.0.0.1".into(),
        };
        assert_eq!("10.0.0.1", timeout.address());
        assert_eq!(-1.0, timeout.response_time());
    }
}
