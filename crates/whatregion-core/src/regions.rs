//! Static catalog of App Store storefronts, grouped by continent.
//!
//! The table is the single source of truth for which regions a check fans out
//! to. Codes are the lowercase two-letter storefront codes accepted by the
//! lookup API's `country` parameter.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    LatinAmerica,
    MiddleEast,
    NorthAmerica,
    Oceania,
}

impl Continent {
    pub const ALL: [Continent; 7] = [
        Continent::Africa,
        Continent::Asia,
        Continent::Europe,
        Continent::LatinAmerica,
        Continent::MiddleEast,
        Continent::NorthAmerica,
        Continent::Oceania,
    ];

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::LatinAmerica => "Latin America & Caribbean",
            Continent::MiddleEast => "Middle East",
            Continent::NorthAmerica => "North America",
            Continent::Oceania => "Oceania",
        }
    }
}

impl std::fmt::Display for Continent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One storefront in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub code: &'static str,
    pub name: &'static str,
    pub continent: Continent,
}

impl Region {
    const fn new(code: &'static str, name: &'static str, continent: Continent) -> Self {
        Self {
            code,
            name,
            continent,
        }
    }

    /// Flag emoji built from the storefront code's regional indicator symbols.
    #[must_use]
    pub fn glyph(&self) -> String {
        self.code
            .chars()
            .filter_map(|c| {
                let offset = u32::from(c.to_ascii_lowercase()).checked_sub(u32::from('a'))?;
                char::from_u32(0x1F1E6 + offset)
            })
            .collect()
    }

    /// Storefront page for `app_id` in this region.
    #[must_use]
    pub fn store_url(&self, app_id: &str) -> String {
        format!("https://apps.apple.com/{}/app/id{app_id}", self.code)
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Region", 4)?;
        state.serialize_field("code", self.code)?;
        state.serialize_field("name", self.name)?;
        state.serialize_field("glyph", &self.glyph())?;
        state.serialize_field("continent", &self.continent)?;
        state.end()
    }
}

use Continent::{Africa, Asia, Europe, LatinAmerica, MiddleEast, NorthAmerica, Oceania};

pub static REGIONS: &[Region] = &[
    Region::new("dz", "Algeria", Africa),
    Region::new("ao", "Angola", Africa),
    Region::new("bj", "Benin", Africa),
    Region::new("bw", "Botswana", Africa),
    Region::new("bf", "Burkina Faso", Africa),
    Region::new("cm", "Cameroon", Africa),
    Region::new("cv", "Cape Verde", Africa),
    Region::new("td", "Chad", Africa),
    Region::new("cd", "Congo, Democratic Republic of the", Africa),
    Region::new("cg", "Congo, Republic of the", Africa),
    Region::new("ci", "Côte d'Ivoire", Africa),
    Region::new("eg", "Egypt", Africa),
    Region::new("sz", "Eswatini", Africa),
    Region::new("ga", "Gabon", Africa),
    Region::new("gm", "Gambia", Africa),
    Region::new("gh", "Ghana", Africa),
    Region::new("gw", "Guinea-Bissau", Africa),
    Region::new("ke", "Kenya", Africa),
    Region::new("lr", "Liberia", Africa),
    Region::new("ly", "Libya", Africa),
    Region::new("mg", "Madagascar", Africa),
    Region::new("mw", "Malawi", Africa),
    Region::new("ml", "Mali", Africa),
    Region::new("mr", "Mauritania", Africa),
    Region::new("mu", "Mauritius", Africa),
    Region::new("ma", "Morocco", Africa),
    Region::new("mz", "Mozambique", Africa),
    Region::new("na", "Namibia", Africa),
    Region::new("ne", "Niger", Africa),
    Region::new("ng", "Nigeria", Africa),
    Region::new("rw", "Rwanda", Africa),
    Region::new("st", "São Tomé and Príncipe", Africa),
    Region::new("sn", "Senegal", Africa),
    Region::new("sc", "Seychelles", Africa),
    Region::new("sl", "Sierra Leone", Africa),
    Region::new("za", "South Africa", Africa),
    Region::new("tz", "Tanzania", Africa),
    Region::new("tn", "Tunisia", Africa),
    Region::new("ug", "Uganda", Africa),
    Region::new("zm", "Zambia", Africa),
    Region::new("zw", "Zimbabwe", Africa),
    Region::new("af", "Afghanistan", Asia),
    Region::new("am", "Armenia", Asia),
    Region::new("az", "Azerbaijan", Asia),
    Region::new("bt", "Bhutan", Asia),
    Region::new("bn", "Brunei", Asia),
    Region::new("kh", "Cambodia", Asia),
    Region::new("cn", "China", Asia),
    Region::new("ge", "Georgia", Asia),
    Region::new("hk", "Hong Kong", Asia),
    Region::new("in", "India", Asia),
    Region::new("id", "Indonesia", Asia),
    Region::new("jp", "Japan", Asia),
    Region::new("kz", "Kazakhstan", Asia),
    Region::new("kr", "Korea, Republic of", Asia),
    Region::new("kg", "Kyrgyzstan", Asia),
    Region::new("la", "Laos", Asia),
    Region::new("mo", "Macao", Asia),
    Region::new("my", "Malaysia", Asia),
    Region::new("mv", "Maldives", Asia),
    Region::new("mn", "Mongolia", Asia),
    Region::new("mm", "Myanmar", Asia),
    Region::new("np", "Nepal", Asia),
    Region::new("pk", "Pakistan", Asia),
    Region::new("ph", "Philippines", Asia),
    Region::new("sg", "Singapore", Asia),
    Region::new("lk", "Sri Lanka", Asia),
    Region::new("tw", "Taiwan", Asia),
    Region::new("tj", "Tajikistan", Asia),
    Region::new("th", "Thailand", Asia),
    Region::new("tm", "Turkmenistan", Asia),
    Region::new("uz", "Uzbekistan", Asia),
    Region::new("vn", "Vietnam", Asia),
    Region::new("al", "Albania", Europe),
    Region::new("at", "Austria", Europe),
    Region::new("by", "Belarus", Europe),
    Region::new("be", "Belgium", Europe),
    Region::new("ba", "Bosnia and Herzegovina", Europe),
    Region::new("bg", "Bulgaria", Europe),
    Region::new("hr", "Croatia", Europe),
    Region::new("cy", "Cyprus", Europe),
    Region::new("cz", "Czechia", Europe),
    Region::new("dk", "Denmark", Europe),
    Region::new("ee", "Estonia", Europe),
    Region::new("fi", "Finland", Europe),
    Region::new("fr", "France", Europe),
    Region::new("de", "Germany", Europe),
    Region::new("gr", "Greece", Europe),
    Region::new("hu", "Hungary", Europe),
    Region::new("is", "Iceland", Europe),
    Region::new("ie", "Ireland", Europe),
    Region::new("it", "Italy", Europe),
    Region::new("xk", "Kosovo", Europe),
    Region::new("lv", "Latvia", Europe),
    Region::new("lt", "Lithuania", Europe),
    Region::new("lu", "Luxembourg", Europe),
    Region::new("mt", "Malta", Europe),
    Region::new("md", "Moldova", Europe),
    Region::new("me", "Montenegro", Europe),
    Region::new("nl", "Netherlands", Europe),
    Region::new("mk", "North Macedonia", Europe),
    Region::new("no", "Norway", Europe),
    Region::new("pl", "Poland", Europe),
    Region::new("pt", "Portugal", Europe),
    Region::new("ro", "Romania", Europe),
    Region::new("ru", "Russia", Europe),
    Region::new("rs", "Serbia", Europe),
    Region::new("sk", "Slovakia", Europe),
    Region::new("si", "Slovenia", Europe),
    Region::new("es", "Spain", Europe),
    Region::new("se", "Sweden", Europe),
    Region::new("ch", "Switzerland", Europe),
    Region::new("tr", "Türkiye", Europe),
    Region::new("ua", "Ukraine", Europe),
    Region::new("gb", "United Kingdom", Europe),
    Region::new("ai", "Anguilla", LatinAmerica),
    Region::new("ag", "Antigua and Barbuda", LatinAmerica),
    Region::new("ar", "Argentina", LatinAmerica),
    Region::new("bs", "Bahamas", LatinAmerica),
    Region::new("bb", "Barbados", LatinAmerica),
    Region::new("bz", "Belize", LatinAmerica),
    Region::new("bm", "Bermuda", LatinAmerica),
    Region::new("bo", "Bolivia", LatinAmerica),
    Region::new("br", "Brazil", LatinAmerica),
    Region::new("vg", "British Virgin Islands", LatinAmerica),
    Region::new("ky", "Cayman Islands", LatinAmerica),
    Region::new("cl", "Chile", LatinAmerica),
    Region::new("co", "Colombia", LatinAmerica),
    Region::new("cr", "Costa Rica", LatinAmerica),
    Region::new("dm", "Dominica", LatinAmerica),
    Region::new("do", "Dominican Republic", LatinAmerica),
    Region::new("ec", "Ecuador", LatinAmerica),
    Region::new("sv", "El Salvador", LatinAmerica),
    Region::new("gd", "Grenada", LatinAmerica),
    Region::new("gt", "Guatemala", LatinAmerica),
    Region::new("gy", "Guyana", LatinAmerica),
    Region::new("hn", "Honduras", LatinAmerica),
    Region::new("jm", "Jamaica", LatinAmerica),
    Region::new("ms", "Montserrat", LatinAmerica),
    Region::new("ni", "Nicaragua", LatinAmerica),
    Region::new("pa", "Panama", LatinAmerica),
    Region::new("py", "Paraguay", LatinAmerica),
    Region::new("pe", "Peru", LatinAmerica),
    Region::new("kn", "St. Kitts and Nevis", LatinAmerica),
    Region::new("lc", "St. Lucia", LatinAmerica),
    Region::new("vc", "St. Vincent and the Grenadines", LatinAmerica),
    Region::new("sr", "Suriname", LatinAmerica),
    Region::new("tt", "Trinidad and Tobago", LatinAmerica),
    Region::new("tc", "Turks and Caicos Islands", LatinAmerica),
    Region::new("uy", "Uruguay", LatinAmerica),
    Region::new("ve", "Venezuela", LatinAmerica),
    Region::new("bh", "Bahrain", MiddleEast),
    Region::new("iq", "Iraq", MiddleEast),
    Region::new("il", "Israel", MiddleEast),
    Region::new("jo", "Jordan", MiddleEast),
    Region::new("kw", "Kuwait", MiddleEast),
    Region::new("lb", "Lebanon", MiddleEast),
    Region::new("om", "Oman", MiddleEast),
    Region::new("qa", "Qatar", MiddleEast),
    Region::new("sa", "Saudi Arabia", MiddleEast),
    Region::new("ae", "United Arab Emirates", MiddleEast),
    Region::new("ye", "Yemen", MiddleEast),
    Region::new("ca", "Canada", NorthAmerica),
    Region::new("mx", "Mexico", NorthAmerica),
    Region::new("us", "United States", NorthAmerica),
    Region::new("au", "Australia", Oceania),
    Region::new("fj", "Fiji", Oceania),
    Region::new("fm", "Micronesia", Oceania),
    Region::new("nr", "Nauru", Oceania),
    Region::new("nz", "New Zealand", Oceania),
    Region::new("pw", "Palau", Oceania),
    Region::new("pg", "Papua New Guinea", Oceania),
    Region::new("sb", "Solomon Islands", Oceania),
    Region::new("to", "Tonga", Oceania),
    Region::new("vu", "Vanuatu", Oceania),
];

/// Case-insensitive lookup of a storefront code in [`REGIONS`].
#[must_use]
pub fn find_region(code: &str) -> Option<&'static Region> {
    let code = code.trim();
    REGIONS.iter().find(|r| r.code.eq_ignore_ascii_case(code))
}

/// The catalog grouped by continent, in [`Continent::ALL`] order. Continents
/// with no regions are omitted.
#[must_use]
pub fn regions_by_continent() -> Vec<(Continent, Vec<&'static Region>)> {
    Continent::ALL
        .iter()
        .filter_map(|&continent| {
            let regions: Vec<&'static Region> = REGIONS
                .iter()
                .filter(|r| r.continent == continent)
                .collect();
            (!regions.is_empty()).then_some((continent, regions))
        })
        .collect()
}
