//! Decides which downstream syncs apply to a status change.
use crate::models::{Attribution, PlatformName, TargetStatus};
use std::collections::BTreeSet;

/// Returns the platforms that should be called for this status change.
///
/// Analytics is always applicable. Advertising platforms are applicable only
/// for conversion statuses and only when the lead carries a non-empty click
/// identifier for them; a missing identifier shrinks the set, it is never an error.
pub fn applicable_platforms(
    attribution: &Attribution,
    target_status: TargetStatus,
) -> BTreeSet<PlatformName> {
    PlatformName::ALL
        .into_iter()
        .filter(|platform| {
            if !platform.is_ad_platform() {
                return true;
            }
            target_status.is_conversion() && attribution.click_id(*platform).is_some()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribution(gclid: Option<&str>, fbclid: Option<&str>, msclkid: Option<&str>) -> Attribution {
        Attribution {
            gclid: gclid.map(String::from),
            fbclid: fbclid.map(String::from),
            msclkid: msclkid.map(String::from),
        }
    }

    #[test]
    fn test_lost_only_reaches_analytics() {
        let all = attribution(Some("g"), Some("f"), Some("m"));
        let platforms = applicable_platforms(&all, TargetStatus::Lost);

        assert_eq!(
            platforms.into_iter().collect::<Vec<_>>(),
            vec![PlatformName::GoogleAnalytics]
        );
    }

    #[test]
    fn test_won_with_only_gclid() {
        let only_google = attribution(Some("gclid-1"), None, None);
        let platforms = applicable_platforms(&only_google, TargetStatus::Won);

        assert_eq!(
            platforms.into_iter().collect::<Vec<_>>(),
            vec![PlatformName::GoogleAds, PlatformName::GoogleAnalytics]
        );
    }

    #[test]
    fn test_no_identifiers_still_reaches_analytics() {
        let platforms = applicable_platforms(&Attribution::default(), TargetStatus::Qualified);
        assert_eq!(
            platforms.into_iter().collect::<Vec<_>>(),
            vec![PlatformName::GoogleAnalytics]
        );
    }

    #[test]
    fn test_empty_identifiers_are_skipped() {
        let blanks = attribution(Some(""), Some(" "), Some("msclkid-9"));
        let platforms = applicable_platforms(&blanks, TargetStatus::Qualified);

        assert!(!platforms.contains(&PlatformName::GoogleAds));
        assert!(!platforms.contains(&PlatformName::MetaAds));
        assert!(platforms.contains(&PlatformName::MicrosoftAds));
    }
}
