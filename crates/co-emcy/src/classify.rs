//! Static emergency error code classification.
//!
//! Codes are grouped into families by their high byte or high nibble, per the
//! CiA 301 emergency error code table. A code belongs to a rule when
//! `code & mask == pattern`; the table is scanned in order and the first hit
//! wins.

/// One row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    pub pattern: u16,
    pub mask: u16,
    pub label: &'static str,
}

impl ClassificationRule {
    const fn new(pattern: u16, mask: u16, label: &'static str) -> Self {
        Self {
            pattern,
            mask,
            label,
        }
    }

    pub fn matches(&self, code: u16) -> bool {
        code & self.mask == self.pattern
    }
}

/// Error code families, in match order.
pub static RULES: &[ClassificationRule] = &[
    ClassificationRule::new(0x0000, 0xFF00, "No Error"),
    ClassificationRule::new(0x1000, 0xFF00, "Generic Error"),
    ClassificationRule::new(0x2000, 0xF000, "Current"),
    ClassificationRule::new(0x3000, 0xF000, "Voltage"),
    ClassificationRule::new(0x4000, 0xF000, "Temperature"),
    ClassificationRule::new(0x5000, 0xFF00, "Device Hardware"),
    ClassificationRule::new(0x6000, 0xF000, "Device Software"),
    ClassificationRule::new(0x7000, 0xFF00, "Additional Modules"),
    ClassificationRule::new(0x8000, 0xF000, "Monitoring"),
    ClassificationRule::new(0x9000, 0xFF00, "External Error"),
    ClassificationRule::new(0xF000, 0xFF00, "Additional Functions"),
    ClassificationRule::new(0xFF00, 0xFF00, "Device Specific"),
];

/// First rule matching `code`, if any.
pub fn lookup(code: u16) -> Option<&'static ClassificationRule> {
    RULES.iter().find(|rule| rule.matches(code))
}

/// Render `code` as fixed-width hex followed by its family label, e.g.
/// `0x3210 Voltage`. Unclassified codes render as the hex value alone.
pub fn classify(code: u16) -> String {
    match lookup(code) {
        Some(rule) => format!("{code:#06x} {}", rule.label),
        None => format!("{code:#06x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_families() {
        assert_eq!(classify(0x0000), "0x0000 No Error");
        assert_eq!(classify(0x1000), "0x1000 Generic Error");
        assert_eq!(classify(0x2310), "0x2310 Current");
        assert_eq!(classify(0x3210), "0x3210 Voltage");
        assert_eq!(classify(0x4310), "0x4310 Temperature");
        assert_eq!(classify(0x5030), "0x5030 Device Hardware");
        assert_eq!(classify(0x6101), "0x6101 Device Software");
        assert_eq!(classify(0x7000), "0x7000 Additional Modules");
        assert_eq!(classify(0x8130), "0x8130 Monitoring");
        assert_eq!(classify(0x9000), "0x9000 External Error");
        assert_eq!(classify(0xF001), "0xf001 Additional Functions");
        assert_eq!(classify(0xFF42), "0xff42 Device Specific");
    }

    #[test]
    fn unclassified_codes_render_bare() {
        assert_eq!(classify(0xA000), "0xa000");
        assert_eq!(classify(0x5100), "0x5100");
        assert_eq!(classify(0xF100), "0xf100");
        assert!(lookup(0xE123).is_none());
    }

    /// Behaviour change: the rule test used to read `mask & (code == pattern)`
    /// and the scan stopped after the first row whether it matched or not, so
    /// no code was ever labelled. Masking is now applied before comparing.
    #[test]
    fn mask_is_applied_before_comparing() {
        let degenerate = |code: u16| {
            let rule = &RULES[0];
            rule.mask & u16::from(code == rule.pattern) != 0
        };
        assert!(!degenerate(0x3210));
        assert!(!degenerate(0x0000));

        assert_eq!(lookup(0x3210).map(|r| r.label), Some("Voltage"));
        assert_eq!(lookup(0x0000).map(|r| r.label), Some("No Error"));
    }

    #[test]
    fn rules_never_overlap() {
        for code in 0..=u16::MAX {
            let hits = RULES.iter().filter(|r| r.matches(code)).count();
            assert!(hits <= 1, "code {code:#06x} matches {hits} rules");
        }
    }

    #[test]
    fn patterns_fit_their_masks() {
        for rule in RULES {
            assert_eq!(rule.pattern & rule.mask, rule.pattern, "{}", rule.label);
        }
    }

    proptest! {
        #[test]
        fn classify_is_total_and_deterministic(code in any::<u16>()) {
            let first = classify(code);
            prop_assert_eq!(&first, &classify(code));

            let prefix = format!("{code:#06x}");
            prop_assert!(first.starts_with(&prefix));
            match lookup(code) {
                Some(rule) => prop_assert_eq!(first, format!("{prefix} {}", rule.label)),
                None => prop_assert_eq!(first, prefix),
            }
        }
    }
}
