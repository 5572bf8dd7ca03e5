use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize};

/// One stage of the tournament. Position in the round list is the stage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub packs: Vec<Pack>,
    #[serde(rename = "winnerchamp", default, skip_serializing_if = "Option::is_none")]
    pub champion: Option<ChampionPointer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionPointer {
    pub pack: usize,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(rename = "winnerIndex", default, skip_serializing_if = "Option::is_none")]
    pub winners: Option<WinnerMarker>,
    #[serde(rename = "winnerchampIndex", default, skip_serializing_if = "Option::is_none")]
    pub champion_index: Option<usize>,
}

/// Which slots of a pack advance. Stored either as a bare index or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WinnerMarker {
    Single(usize),
    Many(Vec<usize>),
}

impl WinnerMarker {
    pub fn contains(&self, position: usize) -> bool {
        match self {
            WinnerMarker::Single(index) => *index == position,
            WinnerMarker::Many(indices) => indices.contains(&position),
        }
    }
}

/// A seat in a pack. A slot without a name is a placeholder for a participant
/// that is not known yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(rename = "noDescription", default, skip_serializing_if = "is_false")]
    pub no_description: bool,
    #[serde(rename = "_promotedFrom", default, skip_serializing_if = "Option::is_none")]
    pub promoted_from: Option<PromotionOrigin>,
    #[serde(rename = "_showPromoted", default, skip_serializing_if = "is_false")]
    pub show_promoted: bool,
}

impl Team {
    pub fn named(name: &str, grade: &str, branch: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            grade: Some(grade.to_owned()),
            branch: Some(branch.to_owned()),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionOrigin {
    pub round_name: String,
    pub pack_title: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Labels may be stored as `null`; they read as empty and get a fallback label.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, thiserror::Error)]
pub enum BracketError {
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("mount point {0} not found")]
    MissingMount(String),
}

impl BracketError {
    pub(crate) fn malformed<E: std::fmt::Display>(err: E) -> Self {
        Self::MalformedSnapshot(err.to_string())
    }

    pub(crate) fn storage<E: std::fmt::Display>(err: E) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Accepts a round list only if it can drive the bracket: at least one round.
pub fn validate_rounds(rounds: &[Round]) -> Result<(), BracketError> {
    if rounds.is_empty() {
        return Err(BracketError::InvalidState(
            "round list must contain at least one round".to_owned(),
        ));
    }
    Ok(())
}

static CANONICAL_TOURNAMENT: Lazy<Vec<Round>> = Lazy::new(build_canonical_tournament);

/// Fresh copy of the built-in tournament. The seed itself is never handed out.
pub fn default_tournament() -> Vec<Round> {
    CANONICAL_TOURNAMENT.clone()
}

fn build_canonical_tournament() -> Vec<Round> {
    let pack = |title: &str, teams: Vec<Team>, winners: Option<WinnerMarker>| Pack {
        title: title.to_owned(),
        teams,
        winners,
        champion_index: None,
    };
    let placeholders = |count: usize| vec![Team::empty(); count];

    vec![
        Round {
            name: "Отборочные".to_owned(),
            packs: vec![
                pack(
                    "Пачка A — 7 класс",
                    vec![
                        Team::named("Альфа", "7", "Север"),
                        Team::named("Бета", "7", "Юг"),
                        Team::named("Гамма", "7", "Север"),
                        Team::named("Дельта", "7", "Юг"),
                        Team::named("Эпсилон", "7", "Север"),
                        Team::named("Зета", "7", "Юг"),
                    ],
                    Some(WinnerMarker::Many(vec![0, 1])),
                ),
                pack(
                    "Пачка B — 8 класс",
                    vec![
                        Team::named("Икс", "8", "Север"),
                        Team::named("Йота", "8", "Юг"),
                        Team::named("Каппа", "8", "Север"),
                        Team::named("Лямбда", "8", "Юг"),
                        Team::named("Мю", "8", "Север"),
                        Team::named("Ню", "8", "Юг"),
                    ],
                    Some(WinnerMarker::Many(vec![0, 2])),
                ),
                pack(
                    "Пачка C — смешанная",
                    vec![
                        Team::named("Омега", "9", "Север"),
                        Team::named("Пси", "9", "Юг"),
                        Team::named("Ро", "10", "Север"),
                        Team::named("Сигма", "10", "Юг"),
                        Team::named("Тау", "11", "Север"),
                        Team::named("Упсилон", "11", "Юг"),
                    ],
                    Some(WinnerMarker::Many(vec![4, 5])),
                ),
            ],
            champion: None,
        },
        Round {
            name: "Вторая стадия".to_owned(),
            packs: vec![
                pack("Пачка D", placeholders(3), None),
                pack("Пачка E", placeholders(3), None),
            ],
            champion: None,
        },
        Round {
            name: "Полуфинал".to_owned(),
            packs: vec![
                pack("Пачка F1", placeholders(2), None),
                pack("Пачка F2", placeholders(2), None),
            ],
            champion: None,
        },
        Round {
            name: "Финал".to_owned(),
            packs: vec![pack(
                "Финальная пачка",
                vec![
                    Team::named("Титул", "11", "Север"),
                    Team::named("Претендент", "11", "Юг"),
                ],
                None,
            )],
            champion: Some(ChampionPointer { pack: 0, index: 0 }),
        },
    ]
}
