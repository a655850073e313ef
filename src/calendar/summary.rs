//! Present-session counts per person, the figure the practice bills on.

use std::cmp::Ordering;
use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::appointments::{AppointmentMap, Status};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionCount {
    pub display_name: String,
    pub count: usize,
}

/// Count `present` appointments per person.
///
/// People are matched on trimmed, lowercased first and last names. The
/// displayed name is the spelling of that person's earliest slot.
pub fn sessions_summary(appointments: &AppointmentMap) -> Vec<SessionCount> {
    let mut buckets: HashMap<(String, String), SessionCount> = HashMap::new();

    for appt in appointments
        .values()
        .filter(|appt| appt.status == Status::Present)
    {
        let person = (
            appt.first_name.trim().to_lowercase(),
            appt.last_name.trim().to_lowercase(),
        );
        buckets
            .entry(person)
            .or_insert_with(|| SessionCount {
                display_name: appt.display_name(),
                count: 0,
            })
            .count += 1;
    }

    buckets
        .into_values()
        .sorted_by(|a, b| compare_names(&a.display_name, &b.display_name))
        .collect()
}

/// Dictionary order for names: case and accents only break ties, so
/// `émile` files next to `Emile` rather than after `Zoé`.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Lowercase with Latin diacritics folded and ligatures expanded. Letters
/// outside the table are compared as they are.
fn collation_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        match c {
            'œ' => key.push_str("oe"),
            'æ' => key.push_str("ae"),
            'ß' => key.push_str("ss"),
            'ĳ' => key.push_str("ij"),
            other => key.push(fold_accent(other)),
        }
    }
    key
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => 'c',
        'ď' | 'đ' | 'ð' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ğ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => 'i',
        'ķ' => 'k',
        'ł' | 'ľ' | 'ĺ' | 'ļ' => 'l',
        'ñ' | 'ń' | 'ň' | 'ņ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'š' | 'ş' | 'ș' => 's',
        'ť' | 'ţ' | 'ț' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}
