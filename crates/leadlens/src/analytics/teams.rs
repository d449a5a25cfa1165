use std::collections::{BTreeMap, BTreeSet};

/// Static team-name → rep roster table. Configuration data for the filter
/// engine and the health board, never computed from leads.
#[derive(Debug, Clone, Default)]
pub struct TeamRoster {
    teams: BTreeMap<String, Vec<String>>,
}

impl TeamRoster {
    pub fn new<I, K, M>(teams: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<M>)>,
        K: Into<String>,
        M: Into<String>,
    {
        let teams = teams
            .into_iter()
            .map(|(name, members)| {
                (
                    name.into(),
                    members.into_iter().map(Into::into).collect::<Vec<_>>(),
                )
            })
            .collect();
        Self { teams }
    }

    /// The roster shipped with the dashboard.
    pub fn standard() -> Self {
        Self::new([
            ("Team Bosphorus", vec!["Ayse", "Mehmet", "Elif"]),
            ("Team Aegean", vec!["Deniz", "Can", "Zeynep"]),
            ("Team International", vec!["Sofia", "Liam", "Mara"]),
        ])
    }

    pub fn team_names(&self) -> impl Iterator<Item = &str> {
        self.teams.keys().map(String::as_str)
    }

    pub fn members(&self, team: &str) -> Option<&[String]> {
        self.teams.get(team).map(Vec::as_slice)
    }

    /// Union of the rosters of the selected teams. Unknown team names
    /// contribute nothing.
    pub fn members_of(&self, teams: &[String]) -> BTreeSet<&str> {
        teams
            .iter()
            .filter_map(|team| self.teams.get(team))
            .flat_map(|members| members.iter().map(String::as_str))
            .collect()
    }
}
