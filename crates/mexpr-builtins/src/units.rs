//! Plain unit identifiers.
//!
//! A plain unit is a bare identifier such as `cm` or `kg`: a base unit name,
//! optionally preceded by an SI prefix when the base accepts one.

/// Base unit names and whether they accept an SI prefix.
const BASE_UNITS: &[(&str, bool)] = &[
    // length
    ("m", true),
    ("meter", true),
    ("inch", false),
    ("in", false),
    ("ft", false),
    ("foot", false),
    ("yd", false),
    ("mi", false),
    ("mile", false),
    // mass
    ("g", true),
    ("gram", true),
    ("lb", false),
    ("oz", false),
    ("ton", false),
    // time
    ("s", true),
    ("second", true),
    ("min", false),
    ("minute", false),
    ("h", false),
    ("hour", false),
    ("day", false),
    // volume
    ("l", true),
    ("L", true),
    ("litre", true),
    // temperature
    ("K", false),
    ("degC", false),
    ("degF", false),
    // angle
    ("rad", false),
    ("deg", false),
    // electric / energy
    ("A", true),
    ("V", true),
    ("W", true),
    ("J", true),
    ("Hz", true),
    ("b", true),
    ("B", true),
];

/// Short SI prefixes, longest first so `da` wins over `d`.
const PREFIXES: &[&str] = &[
    "da", "Y", "Z", "E", "P", "T", "G", "M", "k", "h", "d", "c", "m", "u", "n", "p", "f", "a",
    "z", "y",
];

/// Whether `name` is a recognised plain unit identifier.
pub fn is_plain_unit(name: &str) -> bool {
    if base_unit(name).is_some() {
        return true;
    }
    PREFIXES.iter().any(|prefix| {
        name.strip_prefix(prefix)
            .and_then(base_unit)
            .is_some_and(|prefixable| prefixable)
    })
}

fn base_unit(name: &str) -> Option<bool> {
    BASE_UNITS
        .iter()
        .find(|(unit, _)| *unit == name)
        .map(|(_, prefixable)| *prefixable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_units() {
        assert!(is_plain_unit("m"));
        assert!(is_plain_unit("inch"));
        assert!(is_plain_unit("degC"));
    }

    #[test]
    fn prefixed_units() {
        assert!(is_plain_unit("cm"));
        assert!(is_plain_unit("km"));
        assert!(is_plain_unit("mg"));
        assert!(is_plain_unit("dam"));
        assert!(is_plain_unit("kHz"));
    }

    #[test]
    fn rejects_unprefixable_and_unknown() {
        assert!(!is_plain_unit("kinch"));
        assert!(!is_plain_unit("cft"));
        assert!(!is_plain_unit("foo"));
        assert!(!is_plain_unit(""));
        assert!(!is_plain_unit("k"));
    }
}
