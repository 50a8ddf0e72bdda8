use super::group::ManufacturerGroup;

/// WMI prefixes per manufacturer group.
pub(crate) fn group_prefixes(group: ManufacturerGroup) -> &'static [&'static str] {
    match group {
        ManufacturerGroup::Ford => &[
            "1FA", "1FB", "1FC", "1FD", "1FM", "1FT", "1LN", "1LM", "2FA", "2FB", "2FM", "3FA",
            "3FE", "3FM", "5LM",
        ],
        ManufacturerGroup::Stellantis => &[
            // Chrysler
            "1C3", "2C3", "3C3",
            // Jeep / Chrysler MPV
            "1C4", "2C4", "3C4",
            // Ram
            "1C6", "3C6",
            // Dodge legacy
            "1B3", "2B3", "3B3",
            // Jeep legacy
            "1J4", "1J8",
            // Fiat
            "ZFA",
        ],
        ManufacturerGroup::Mazda => &["JM1", "JM3", "7MM"],
        ManufacturerGroup::Hyundai => &["KMH", "KMF", "5NP"],
        ManufacturerGroup::Honda => &["1HG", "2HG", "JHM", "JHL", "5FN", "5J6", "19X"],
        ManufacturerGroup::Kia => &["KNA", "KND", "5XY", "5XX"],
        ManufacturerGroup::Nissan => &["1N4", "1N6", "3N1", "3N6", "5N1", "JN1", "JN8"],
        ManufacturerGroup::Toyota => &[
            "1NX", "2T1", "3TM", "4T1", "5TD", "5TF", "JTD", "JT3", "JT4",
        ],
        ManufacturerGroup::Unknown => &[],
    }
}

/// WMI to brand name. Finer than the group table: Stellantis alone spans
/// Chrysler, Jeep, Ram, Dodge and Fiat.
pub(crate) const WMI_MAKES: &[(&str, &str)] = &[
    ("1FA", "Ford"),
    ("1FB", "Ford"),
    ("1FC", "Ford"),
    ("1FD", "Ford"),
    ("1FM", "Ford"),
    ("1FT", "Ford"),
    ("2FA", "Ford"),
    ("2FB", "Ford"),
    ("2FM", "Ford"),
    ("3FA", "Ford"),
    ("3FE", "Ford"),
    ("3FM", "Ford"),
    ("1LN", "Lincoln"),
    ("1LM", "Lincoln"),
    ("5LM", "Lincoln"),
    ("1C3", "Chrysler"),
    ("2C3", "Chrysler"),
    ("3C3", "Chrysler"),
    ("1C4", "Jeep"),
    ("2C4", "Chrysler"),
    ("3C4", "Chrysler"),
    ("1C6", "Ram"),
    ("3C6", "Ram"),
    ("1B3", "Dodge"),
    ("2B3", "Dodge"),
    ("3B3", "Dodge"),
    ("1J4", "Jeep"),
    ("1J8", "Jeep"),
    ("ZFA", "Fiat"),
    ("JM1", "Mazda"),
    ("JM3", "Mazda"),
    ("7MM", "Mazda"),
    ("KMH", "Hyundai"),
    ("KMF", "Hyundai"),
    ("5NP", "Hyundai"),
    ("1HG", "Honda"),
    ("2HG", "Honda"),
    ("JHM", "Honda"),
    ("JHL", "Honda"),
    ("5FN", "Honda"),
    ("5J6", "Honda"),
    ("19X", "Honda"),
    ("KNA", "Kia"),
    ("KND", "Kia"),
    ("5XY", "Kia"),
    ("5XX", "Kia"),
    ("1N4", "Nissan"),
    ("1N6", "Nissan"),
    ("3N1", "Nissan"),
    ("3N6", "Nissan"),
    ("5N1", "Nissan"),
    ("JN1", "Nissan"),
    ("JN8", "Nissan"),
    ("1NX", "Toyota"),
    ("2T1", "Toyota"),
    ("3TM", "Toyota"),
    ("4T1", "Toyota"),
    ("5TD", "Toyota"),
    ("5TF", "Toyota"),
    ("JTD", "Toyota"),
    ("JT3", "Toyota"),
    ("JT4", "Toyota"),
];

/// Ford 11th character (assembly plant) to hold code and plant name.
pub(crate) const FORD_PLANTS: &[(char, &str, &str)] = &[
    ('B', "AP05A", "Oakville Assembly"),
    ('D', "AP09A", "Ohio Assembly"),
    ('E', "AP07A", "Kentucky Truck Assembly"),
    ('F', "AP03A", "Dearborn Truck Assembly"),
    ('G', "AP01A", "Chicago Assembly"),
    ('J', "GN4UA", "China CAF Hangzhou Assembly"),
    ('K', "AP08A", "Kansas City Assembly"),
    ('L', "AP02A", "Michigan Assembly"),
    ('M', "MX01A", "Cuautitlan Assembly"),
    ('R', "MX02A", "Hermosillo Assembly"),
    ('U', "AP04A", "Louisville Assembly"),
];
