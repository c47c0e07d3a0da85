//! Species tags of gene names.
//!
//! Gene names follow the `<anything>_<SPECIES>` convention. The species tag is
//! everything after the first underscore; a name without underscore is its own
//! species.

/// Returns the species tag of a gene name.
///
/// # Examples
/// ```
/// # use cladenorm::model::species_tag;
/// assert_eq!(species_tag("Phy0001ABC_9606"), "9606");
/// assert_eq!(species_tag("A_sp1_copy"), "sp1_copy");
/// assert_eq!(species_tag("HUMAN"), "HUMAN");
/// ```
pub fn species_tag(name: &str) -> &str {
    match name.split_once('_') {
        Some((_, species)) => species,
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_underscore_gives_empty_tag() {
        assert_eq!(species_tag("gene_"), "");
    }

    #[test]
    fn test_leading_underscore() {
        assert_eq!(species_tag("_MOUSE"), "MOUSE");
    }
}
