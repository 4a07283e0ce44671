//! Static table of downloadable Encuesta de Hogares editions.
//!
//! Each entry maps a survey year to the value the INE page's project
//! dropdown expects and to the label shown in the UI. The table is
//! compiled in and never mutated.

/// One downloadable survey edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Survey {
    /// Survey year (2005..=2018, 2010 was not published).
    pub year: u16,
    /// Opaque value of the corresponding `<option>` in the `#proyecto` select.
    pub dropdown_value: &'static str,
    /// Display name as it appears on the INE page.
    pub name: &'static str,
}

impl Survey {
    /// Target filename a completed download is renamed to.
    pub fn canonical_name(&self) -> String {
        canonical_name(self.year)
    }
}

/// Canonical archive name for a survey year.
pub fn canonical_name(year: u16) -> String {
    format!("eh_{year}.zip")
}

/// All known surveys, newest first. Processing order follows this slice.
pub fn all() -> &'static [Survey] {
    SURVEYS
}

/// Look up a single survey by year.
pub fn by_year(year: u16) -> Option<&'static Survey> {
    SURVEYS.iter().find(|s| s.year == year)
}

const SURVEYS: &[Survey] = &[
    Survey {
        year: 2018,
        dropdown_value: "45;43",
        name: "Encuesta de Hogares 2018",
    },
    Survey {
        year: 2017,
        dropdown_value: "43;41",
        name: "Encuesta de Hogares 2017",
    },
    Survey {
        year: 2016,
        dropdown_value: "41;39",
        name: "Encuesta de Hogares 2016",
    },
    Survey {
        year: 2015,
        dropdown_value: "35;35",
        name: "Encuesta de Hogares 2015",
    },
    Survey {
        year: 2014,
        dropdown_value: "34;34",
        name: "Encuesta de Hogares 2014 (Factor de Expansión 2014)",
    },
    Survey {
        year: 2013,
        dropdown_value: "33;33",
        name: "Encuesta de Hogares 2013 (Factor de Expansión 2014)",
    },
    Survey {
        year: 2012,
        dropdown_value: "32;32",
        name: "Encuesta de Hogares 2012 (Factor de Expansión 2014)",
    },
    Survey {
        year: 2011,
        dropdown_value: "31;31",
        name: "Encuesta de Hogares 2011 (Factor de Expansión 2014)",
    },
    Survey {
        year: 2009,
        dropdown_value: "24;24",
        name: "Encuesta de Hogares 2009 (Factor de Expansión 2001)",
    },
    Survey {
        year: 2008,
        dropdown_value: "23;23",
        name: "Encuesta de Hogares 2008 (Factor de Expansión 2001)",
    },
    Survey {
        year: 2007,
        dropdown_value: "26;26",
        name: "Encuesta de Hogares 2007 (Factor de Expansión 2001)",
    },
    Survey {
        year: 2006,
        dropdown_value: "25;25",
        name: "Encuesta de Hogares 2006 (Factor de Expansión 2001)",
    },
    Survey {
        year: 2005,
        dropdown_value: "22;22",
        name: "Encuesta de Hogares 2005 (Factor de Expansión 2001)",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_descending_by_year() {
        let years: Vec<u16> = all().iter().map(|s| s.year).collect();
        let mut sorted = years.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(years, sorted);
    }

    #[test]
    fn test_table_covers_expected_years() {
        assert_eq!(all().len(), 13);
        assert!(by_year(2018).is_some());
        assert!(by_year(2005).is_some());
        // 2010 edition does not exist
        assert!(by_year(2010).is_none());
    }

    #[test]
    fn test_canonical_name() {
        let survey = by_year(2018).unwrap();
        assert_eq!(survey.canonical_name(), "eh_2018.zip");
        assert_eq!(canonical_name(2005), "eh_2005.zip");
    }
}
