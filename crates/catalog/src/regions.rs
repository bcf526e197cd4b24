//! Region code table.
//!
//! Sales carry a short region code keyed to a district name. The code on an
//! inbound sale is stored as received; display resolution happens here, and
//! unknown codes fall back to the raw code string.

use serde::{Deserialize, Serialize};

use pikwa_core::ValueObject;

/// Region code as received on a sale command. Stored even when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// District name for known numeric codes, the raw code otherwise.
    pub fn display_name(&self) -> &str {
        self.0
            .parse::<u16>()
            .ok()
            .and_then(|code| DISTRICTS.iter().find(|(c, _)| *c == code))
            .map(|(_, name)| *name)
            .unwrap_or(&self.0)
    }
}

impl core::fmt::Display for Region {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl ValueObject for Region {}

/// District codes: hundreds digit is the sub-region.
pub const DISTRICTS: &[(u16, &str)] = &[
    (101, "Kalangala"),
    (102, "Kampala"),
    (103, "Kiboga"),
    (104, "Luwero"),
    (105, "Masaka"),
    (106, "Mpigi"),
    (107, "Mubende"),
    (108, "Mukono"),
    (109, "Nakasongola"),
    (110, "Rakai"),
    (111, "Sembabule"),
    (112, "Kayunga"),
    (113, "Wakiso"),
    (114, "Mityana"),
    (115, "Nakaseke"),
    (116, "Lyantonde"),
    (201, "Bugiri"),
    (202, "Busia"),
    (203, "Iganga"),
    (204, "Jinja"),
    (205, "Kamuli"),
    (206, "Kapchorwa"),
    (207, "Katakwi"),
    (208, "Kumi"),
    (209, "Mbale"),
    (210, "Pallisa"),
    (211, "Soroti"),
    (212, "Tororo"),
    (213, "Kaberamaido"),
    (214, "Mayuge"),
    (215, "Sironko"),
    (216, "Amuria"),
    (217, "Budaka"),
    (218, "Bukwa"),
    (219, "Butaleja"),
    (220, "Kaliro"),
    (221, "Manafwa"),
    (222, "Namutumba"),
    (223, "Bududa"),
    (224, "Bukedea"),
    (301, "Adjumani"),
    (302, "Apac"),
    (303, "Arua"),
    (304, "Gulu"),
    (305, "Kitgum"),
    (306, "Kotido"),
    (307, "Lira"),
    (308, "Moroto"),
    (309, "Moyo"),
    (310, "Nebbi"),
    (311, "Nakapiripirit"),
    (312, "Pader"),
    (313, "Yumbe"),
    (314, "Amolatar"),
    (315, "Kaabong"),
    (316, "Koboko"),
    (317, "Abim"),
    (318, "Dokolo"),
    (319, "Amuru"),
    (320, "Maracha"),
    (321, "Oyam"),
    (401, "Bundibugyo"),
    (402, "Bushenyi"),
    (403, "Hoima"),
    (404, "Kabale"),
    (405, "Kabarole"),
    (406, "Kasese"),
    (407, "Kibaale"),
    (408, "Kisoro"),
    (409, "Masindi"),
    (410, "Mbarara"),
    (411, "Ntungamo"),
    (412, "Rukungiri"),
    (413, "Kamwenge"),
    (414, "Kanungu"),
    (415, "Kyenjojo"),
    (416, "Ibanda"),
    (417, "Isingiro"),
    (418, "Kiruhura"),
    (419, "Buliisa"),
];
