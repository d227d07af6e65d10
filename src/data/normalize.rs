//! Canonical display names for countries and provinces.
//!
//! The upstream files renamed regions several times over their lifetime
//! ("Mainland China" → "China", "South Korea" → "Korea, South", ...), so
//! country-level aggregation only merges correctly if every variant maps to
//! one canonical label. Unrecognized names pass through unchanged.

/// Normalize a raw country/region string to its canonical display name.
pub fn normalize_country(raw: &str) -> String {
    let trimmed = raw.trim();

    // Every "…China" variant (Mainland China, Hong Kong SAR rows tagged as
    // China, etc.) rolls up under one label.
    if trimmed.contains("China") {
        return "China".to_string();
    }

    let canonical = match trimmed {
        "Korea, South" | "Republic of Korea" => "South Korea",
        "UK" => "United Kingdom",
        "Iran (Islamic Republic of)" => "Iran",
        "Russian Federation" => "Russia",
        "Viet Nam" => "Vietnam",
        "Taiwan*" | "Taipei and environs" => "Taiwan",
        "Czech Republic" => "Czechia",
        "Hong Kong SAR" => "Hong Kong",
        "Macao SAR" | "Macau" => "Macao",
        "Republic of Moldova" => "Moldova",
        "Republic of Ireland" => "Ireland",
        "Holy See" => "Vatican City",
        other => other,
    };

    canonical.to_string()
}

/// Normalize a raw province/state string; empty means "no subregion".
pub fn normalize_province(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "None" {
        return String::new();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn china_variants_collapse() {
        assert_eq!(normalize_country("Mainland China"), "China");
        assert_eq!(normalize_country("China"), "China");
    }

    #[test]
    fn known_renames_map_to_canonical() {
        assert_eq!(normalize_country("Korea, South"), "South Korea");
        assert_eq!(normalize_country("Republic of Korea"), "South Korea");
        assert_eq!(normalize_country("UK"), "United Kingdom");
        assert_eq!(normalize_country("Taiwan*"), "Taiwan");
        assert_eq!(normalize_country("Viet Nam"), "Vietnam");
    }

    #[test]
    fn unknown_country_passes_through() {
        assert_eq!(normalize_country("Atlantis"), "Atlantis");
        assert_eq!(normalize_country("  Italy "), "Italy");
    }

    #[test]
    fn province_none_becomes_empty() {
        assert_eq!(normalize_province("None"), "");
        assert_eq!(normalize_province(""), "");
        assert_eq!(normalize_province(" Hubei "), "Hubei");
    }
}
