use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TheaterId {
    Beacon,
    SiffUptown,
    SiffDowntown,
    SiffCenter,
    Nwff,
    GrandIllusion,
    CentralCinema,
}

impl TheaterId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TheaterId::Beacon => "beacon",
            TheaterId::SiffUptown => "siff-uptown",
            TheaterId::SiffDowntown => "siff-downtown",
            TheaterId::SiffCenter => "siff-center",
            TheaterId::Nwff => "nwff",
            TheaterId::GrandIllusion => "grand-illusion",
            TheaterId::CentralCinema => "central-cinema",
        }
    }
}

impl fmt::Display for TheaterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TheaterId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_THEATERS
            .iter()
            .map(|t| t.id)
            .find(|id| id.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown theater id: {s}"))
    }
}

/// Static reference data for one venue.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Theater {
    pub id: TheaterId,
    pub name: &'static str,
    pub url: &'static str,
    pub address: &'static str,
    pub address_link: Option<&'static str>,
    pub about: &'static str,
}

pub static THE_BEACON: Theater = Theater {
    id: TheaterId::Beacon,
    name: "The Beacon",
    url: "https://thebeacon.film",
    address: "4405 Rainier Ave S, Seattle, WA 98118",
    address_link: Some("https://www.google.com/maps/search/?api=1&query=4405+Rainier+Ave+S+Seattle+WA"),
    about: "A tiny single-screen cinema in Columbia City programming repertory, cult and new independent film.",
};

pub static SIFF_UPTOWN: Theater = Theater {
    id: TheaterId::SiffUptown,
    name: "SIFF Uptown",
    url: "https://www.siff.net/cinema/cinema-venues/siff-cinema-uptown",
    address: "511 Queen Anne Ave N, Seattle, WA 98109",
    address_link: None,
    about: "Three screens in Lower Queen Anne showing first-run independent and international releases.",
};

pub static SIFF_DOWNTOWN: Theater = Theater {
    id: TheaterId::SiffDowntown,
    name: "SIFF Downtown",
    url: "https://www.siff.net/cinema/cinema-venues/siff-cinema-downtown",
    address: "2100 6th Ave, Seattle, WA 98121",
    address_link: None,
    about: "SIFF's large-format downtown house for premieres, restorations and special engagements.",
};

pub static SIFF_CENTER: Theater = Theater {
    id: TheaterId::SiffCenter,
    name: "SIFF Film Center",
    url: "https://www.siff.net/cinema/cinema-venues/siff-film-center",
    address: "167 Republican St, Seattle, WA 98109",
    address_link: None,
    about: "A screening room at Seattle Center home to series, retrospectives and education programs.",
};

pub static NW_FILM_FORUM: Theater = Theater {
    id: TheaterId::Nwff,
    name: "Northwest Film Forum",
    url: "https://nwfilmforum.org",
    address: "1515 12th Ave, Seattle, WA 98122",
    address_link: None,
    about: "A nonprofit Capitol Hill cinema and arts space presenting independent, experimental and global film.",
};

pub static GRAND_ILLUSION: Theater = Theater {
    id: TheaterId::GrandIllusion,
    name: "Grand Illusion Cinema",
    url: "https://grandillusioncinema.org",
    address: "1403 NE 50th St, Seattle, WA 98105",
    address_link: None,
    about: "Seattle's longest-running independent cinema, volunteer-run in the University District.",
};

pub static CENTRAL_CINEMA: Theater = Theater {
    id: TheaterId::CentralCinema,
    name: "Central Cinema",
    url: "https://www.central-cinema.com",
    address: "1411 21st Ave, Seattle, WA 98122",
    address_link: None,
    about: "A Central District dine-in movie theater with repertory screenings, sing-alongs and cartoon nights.",
};

pub static ALL_THEATERS: [&Theater; 7] = [
    &THE_BEACON,
    &SIFF_UPTOWN,
    &SIFF_DOWNTOWN,
    &SIFF_CENTER,
    &NW_FILM_FORUM,
    &GRAND_ILLUSION,
    &CENTRAL_CINEMA,
];

pub fn theater_by_id(id: TheaterId) -> &'static Theater {
    match id {
        TheaterId::Beacon => &THE_BEACON,
        TheaterId::SiffUptown => &SIFF_UPTOWN,
        TheaterId::SiffDowntown => &SIFF_DOWNTOWN,
        TheaterId::SiffCenter => &SIFF_CENTER,
        TheaterId::Nwff => &NW_FILM_FORUM,
        TheaterId::GrandIllusion => &GRAND_ILLUSION,
        TheaterId::CentralCinema => &CENTRAL_CINEMA,
    }
}
