use std::cmp::Ordering;

/// Dot-separated numeric version such as `2.10.1`. Missing components count as zero.
#[derive(Debug, Clone)]
pub struct AppVersionNumber(Vec<u64>);

impl AppVersionNumber {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim().trim_start_matches(['v', 'V']);
        if trimmed.is_empty() {
            return Err("Version must not be empty".to_string());
        }
        let parts = trimmed
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| format!("Invalid version '{raw}'"))?;
        Ok(Self(parts))
    }

    fn component(&self, idx: usize) -> u64 {
        self.0.get(idx).copied().unwrap_or(0)
    }
}

impl Ord for AppVersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialEq for AppVersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AppVersionNumber {}

impl PartialOrd for AppVersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeAdvice {
    pub update_available: bool,
    pub must_update: bool,
}

pub fn upgrade_advice(
    current: &AppVersionNumber,
    latest: &AppVersionNumber,
    min_supported: &AppVersionNumber,
    is_mandatory: bool,
) -> UpgradeAdvice {
    let update_available = current < latest;
    UpgradeAdvice {
        update_available,
        must_update: current < min_supported || (is_mandatory && update_available),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> AppVersionNumber {
        AppVersionNumber::parse(raw).unwrap()
    }

    #[test]
    fn compares_numerically_not_lexically() {
        assert!(v("1.10.0") > v("1.9.3"));
        assert_eq!(v("2.0").cmp(&v("2.0.0")), Ordering::Equal);
        assert!(v("v3.1") > v("3.0.9"));
    }

    #[test]
    fn rejects_malformed_versions() {
        assert!(AppVersionNumber::parse("").is_err());
        assert!(AppVersionNumber::parse("1.x.0").is_err());
        assert!(AppVersionNumber::parse("1..2").is_err());
    }

    #[test]
    fn below_minimum_forces_update() {
        let advice = upgrade_advice(&v("1.0.0"), &v("1.4.0"), &v("1.2.0"), false);
        assert_eq!(
            advice,
            UpgradeAdvice {
                update_available: true,
                must_update: true
            }
        );
    }

    #[test]
    fn mandatory_flag_only_matters_when_behind() {
        let behind = upgrade_advice(&v("1.3.0"), &v("1.4.0"), &v("1.0.0"), true);
        assert!(behind.must_update);
        let current = upgrade_advice(&v("1.4.0"), &v("1.4.0"), &v("1.0.0"), true);
        assert!(!current.update_available);
        assert!(!current.must_update);
        let optional = upgrade_advice(&v("1.3.0"), &v("1.4.0"), &v("1.0.0"), false);
        assert!(optional.update_available);
        assert!(!optional.must_update);
    }
}
