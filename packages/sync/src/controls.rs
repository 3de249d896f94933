//! Reading [`FilterCriteria`] from the filter controls.
//!
//! A missing control falls back to its default (all types, no severity
//! floor, the default age window). A control that exists but holds a value
//! that does not parse disables that constraint instead.

use disaster_map_disaster_models::{FilterCriteria, TypeFilter};

use crate::surfaces::FilterControls;

/// Builds criteria from the current control values.
#[must_use]
pub fn read_criteria(
    controls: Option<&dyn FilterControls>,
    default_max_age_days: u32,
) -> FilterCriteria {
    let Some(controls) = controls else {
        return FilterCriteria {
            max_age_days: default_max_age_days,
            ..FilterCriteria::default()
        };
    };

    let type_filter = controls
        .type_value()
        .map_or(TypeFilter::All, |value| parse_type(&value));
    let min_severity = controls
        .severity_value()
        .map_or(1, |value| parse_min_severity(&value));
    let max_age_days = controls
        .age_value()
        .map_or(default_max_age_days, |value| parse_max_age(&value));

    let criteria = FilterCriteria {
        type_filter,
        min_severity,
        max_age_days,
    };
    log::debug!("Filter criteria: {criteria:?}");
    criteria
}

fn parse_type(value: &str) -> TypeFilter {
    TypeFilter::parse(value).unwrap_or_else(|| {
        log::warn!("Unknown type filter {value:?}, showing all types");
        TypeFilter::All
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_min_severity(value: &str) -> u8 {
    value
        .trim()
        .parse::<i64>()
        .map_or(1, |n| n.clamp(0, i64::from(u8::MAX)) as u8)
}

fn parse_max_age(value: &str) -> u32 {
    match value.trim().parse::<i64>() {
        Ok(n) => u32::try_from(n.max(0)).unwrap_or(u32::MAX),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use disaster_map_disaster_models::DisasterType;

    use super::*;

    struct Controls {
        kind: Option<&'static str>,
        severity: Option<&'static str>,
        age: Option<&'static str>,
    }

    impl FilterControls for Controls {
        fn type_value(&self) -> Option<String> {
            self.kind.map(str::to_string)
        }

        fn severity_value(&self) -> Option<String> {
            self.severity.map(str::to_string)
        }

        fn age_value(&self) -> Option<String> {
            self.age.map(str::to_string)
        }

        fn reset(&self) {}
    }

    fn read(
        kind: Option<&'static str>,
        severity: Option<&'static str>,
        age: Option<&'static str>,
    ) -> FilterCriteria {
        read_criteria(Some(&Controls { kind, severity, age }), 7)
    }

    #[test]
    fn missing_controls_use_defaults() {
        assert_eq!(read_criteria(None, 7), FilterCriteria::default());
        assert_eq!(read(None, None, None), FilterCriteria::default());
    }

    #[test]
    fn reads_present_values() {
        let criteria = read(Some("Flood"), Some("3"), Some("30"));
        assert_eq!(criteria.type_filter, TypeFilter::Only(DisasterType::Flood));
        assert_eq!(criteria.min_severity, 3);
        assert_eq!(criteria.max_age_days, 30);
    }

    #[test]
    fn unparseable_values_disable_the_constraint() {
        let criteria = read(Some("volcano"), Some("high"), Some("week"));
        assert_eq!(criteria, FilterCriteria::unfiltered());
    }

    #[test]
    fn age_zero_and_negative_mean_no_window() {
        assert_eq!(read(None, None, Some("0")).max_age_days, 0);
        assert_eq!(read(None, None, Some("-3")).max_age_days, 0);
        assert!(!read(None, Some("-2"), None).severity_active());
    }
}
