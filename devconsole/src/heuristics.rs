//! Pinned-string success and rejection markers.
//!
//! Exit codes are not observable over a console stream, so success is
//! inferred from literal substrings of captured output. These markers are
//! heuristics, not protocol guarantees; they are kept here, in one place,
//! and tested against the exact literals.

/// Substrings whose presence marks a ping as successful.
///
/// `!!!!` is the IOS reply train, `bytes from` the iputils reply line.
pub const PING_SUCCESS_MARKERS: &[&str] = &["!!!!", "bytes from"];

/// iputils summary for a lossless run. Must not be preceded by a digit,
/// otherwise `100% packet loss` would count as success.
pub const ZERO_LOSS_MARKER: &str = "0% packet loss";

/// IOS phrases that mean a configuration line was refused.
pub const IOS_REJECTION_MARKERS: &[&str] = &[
    "% Invalid input",
    "% Incomplete command",
    "% Ambiguous command",
    "% Unknown command",
];

/// Classify raw ping output.
pub fn ping_succeeded(output: &str) -> bool {
    PING_SUCCESS_MARKERS
        .iter()
        .any(|marker| output.contains(marker))
        || has_zero_loss(output)
}

fn has_zero_loss(output: &str) -> bool {
    output.match_indices(ZERO_LOSS_MARKER).any(|(pos, _)| {
        !output[..pos]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

/// First IOS rejection marker found in `output`, matched case-insensitively.
pub fn find_rejection(output: &str) -> Option<&'static str> {
    let lowered = output.to_ascii_lowercase();
    IOS_REJECTION_MARKERS
        .iter()
        .copied()
        .find(|marker| lowered.contains(&marker.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_ping_success() {
        let output = "PING 20.0.0.1 (20.0.0.1) 56(84) bytes of data.\n\
                      64 bytes from 20.0.0.1: icmp_seq=1 ttl=64 time=0.9 ms";
        assert!(ping_succeeded(output));
    }

    #[test]
    fn test_ios_ping_success() {
        let output = "Sending 5, 100-byte ICMP Echos to 20.0.0.1, timeout is 2 seconds:\n\
                      !!!!!\n\
                      Success rate is 100 percent (5/5)";
        assert!(ping_succeeded(output));
    }

    #[test]
    fn test_zero_loss_summary() {
        assert!(ping_succeeded("4 packets transmitted, 4 received, 0% packet loss"));
    }

    #[test]
    fn test_total_loss_is_failure() {
        let output = "PING 20.0.0.9 (20.0.0.9) 56(84) bytes of data.\n\
                      4 packets transmitted, 0 received, 100% packet loss, time 3050ms";
        assert!(!ping_succeeded(output));
    }

    #[test]
    fn test_ios_ping_failure() {
        let output = "Sending 5, 100-byte ICMP Echos to 20.0.0.9, timeout is 2 seconds:\n\
                      .....\n\
                      Success rate is 0 percent (0/5)";
        assert!(!ping_succeeded(output));
    }

    #[test]
    fn test_find_rejection() {
        assert_eq!(
            find_rejection("ip adress 1.1.1.1\n     ^\n% Invalid input detected at '^' marker."),
            Some("% Invalid input")
        );
        assert_eq!(
            find_rejection("% INCOMPLETE COMMAND."),
            Some("% Incomplete command")
        );
        assert_eq!(find_rejection("router(config-if)#"), None);
    }
}
