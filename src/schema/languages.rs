//! National language suffixes for data element statements.
//!
//! Some data element statements (`++MSG`, `++PNL`, ...) may carry a
//! three-letter language identifier directly after the base name, as in
//! `++MSGENU` or `++PNLDEU`.

/// Language identifiers SMP/E accepts as statement suffixes.
pub const LANGUAGE_CODES: [&str; 32] = [
    "ARA", "CHS", "CHT", "DAN", "DES", "DEU", "ELL", "ENG", "ENP", "ENU", "ESP", "FIN", "FRA",
    "FRB", "FRC", "FRS", "HEB", "ISL", "ITA", "ITS", "JPN", "KOR", "NLB", "NLD", "NOR", "PTB",
    "PTG", "RMS", "RUS", "SVE", "THA", "TRK",
];

/// Statement bases that accept a language suffix.
pub const LANGUAGE_VARIANT_BASES: [&str; 12] = [
    "++BOOK", "++CGM", "++FONT", "++GDF", "++HELP", "++IMG", "++MSG", "++PNL", "++PROBJ",
    "++PUBLB", "++SKL", "++TBL",
];

pub fn is_language_code(code: &str) -> bool {
    LANGUAGE_CODES.contains(&code)
}

pub fn is_variant_base(name: &str) -> bool {
    LANGUAGE_VARIANT_BASES.contains(&name)
}

/// Splits `++MSGENU` into `("++MSG", "ENU")`.
///
/// Returns `None` when the name is too short to hold a base and a suffix.
pub fn split_language_suffix(name: &str) -> Option<(&str, &str)> {
    if !name.is_ascii() || name.len() < 6 {
        return None;
    }
    Some(name.split_at(name.len() - 3))
}
