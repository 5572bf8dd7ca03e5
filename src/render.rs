//! Pure transform from the working rounds to slide view-models.
//!
//! One slide per round, packs in stored order, teams in stored order after
//! filtering. Rendering the same rounds twice yields equal slides.

use crate::data::{Pack, Round, Team};

pub const EMPTY_SLOT_LABEL: &str = "(пусто)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub keep_empty_slots: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideView {
    pub index: usize,
    pub label: String,
    pub packs: Vec<PackView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackView {
    pub title: String,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotView {
    Empty { position: usize },
    Team(TeamCard),
}

impl SlotView {
    pub fn position(&self) -> usize {
        match self {
            SlotView::Empty { position } => *position,
            SlotView::Team(card) => card.position,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            SlotView::Empty { .. } => "mecom-team empty-slot placeholder",
            SlotView::Team(card) => match card.status {
                SlotStatus::Regular => "mecom-team",
                SlotStatus::Winner => "mecom-team winner",
                SlotStatus::Champion => "mecom-team champion",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamCard {
    pub position: usize,
    pub name: String,
    pub status: SlotStatus,
    /// `None` when the team opts out of descriptions.
    pub tags: Option<TeamTags>,
    pub promoted_note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Regular,
    Winner,
    Champion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamTags {
    pub grade: String,
    pub branch: Option<BranchTag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTag {
    pub text: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    const STEMS: [(Direction, [&'static str; 2]); 4] = [
        (Direction::North, ["север", "north"]),
        (Direction::South, ["юг", "south"]),
        (Direction::East, ["вост", "east"]),
        (Direction::West, ["зап", "west"]),
    ];

    /// Case-insensitive substring match; unknown text lands in `North`.
    pub fn classify(branch: &str) -> Self {
        let lowered = branch.to_lowercase();
        Self::STEMS
            .iter()
            .find(|(_, stems)| stems.iter().any(|stem| lowered.contains(stem)))
            .map(|(direction, _)| *direction)
            .unwrap_or(Direction::North)
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Direction::North => "mecom-tag-north",
            Direction::South => "mecom-tag-south",
            Direction::East => "mecom-tag-east",
            Direction::West => "mecom-tag-west",
        }
    }
}

pub fn round_label(round: &Round, index: usize) -> String {
    if round.name.is_empty() {
        format!("Раунд {}", index + 1)
    } else {
        round.name.clone()
    }
}

pub fn pack_title(pack: &Pack, index: usize) -> String {
    if pack.title.is_empty() {
        format!("Пачка {}", index + 1)
    } else {
        pack.title.clone()
    }
}

pub fn render_slides(rounds: &[Round], options: &RenderOptions) -> Vec<SlideView> {
    rounds
        .iter()
        .enumerate()
        .map(|(index, round)| SlideView {
            index,
            label: round_label(round, index),
            packs: round
                .packs
                .iter()
                .enumerate()
                .map(|(pack_index, pack)| render_pack(round, pack_index, pack, options))
                .collect(),
        })
        .collect()
}

fn render_pack(round: &Round, pack_index: usize, pack: &Pack, options: &RenderOptions) -> PackView {
    let slots = pack
        .teams
        .iter()
        .enumerate()
        .filter_map(|(position, team)| {
            if team.is_empty() {
                return options
                    .keep_empty_slots
                    .then_some(SlotView::Empty { position });
            }
            let status = slot_status(round, pack_index, pack, position);
            Some(SlotView::Team(team_card(team, position, status)))
        })
        .collect();

    PackView {
        title: pack_title(pack, pack_index),
        slots,
    }
}

/// A round-level champion pointer is authoritative; the pack-local index only
/// applies to rounds that carry no pointer.
pub fn slot_status(round: &Round, pack_index: usize, pack: &Pack, position: usize) -> SlotStatus {
    let is_champion = match round.champion {
        Some(pointer) => pointer.pack == pack_index && pointer.index == position,
        None => pack.champion_index == Some(position),
    };

    if is_champion {
        SlotStatus::Champion
    } else if pack
        .winners
        .as_ref()
        .is_some_and(|marker| marker.contains(position))
    {
        SlotStatus::Winner
    } else {
        SlotStatus::Regular
    }
}

fn team_card(team: &Team, position: usize, status: SlotStatus) -> TeamCard {
    let tags = (!team.no_description).then(|| TeamTags {
        grade: team
            .grade
            .as_deref()
            .filter(|grade| !grade.is_empty())
            .map(|grade| format!("{grade} класс"))
            .unwrap_or_default(),
        branch: team
            .branch
            .as_deref()
            .filter(|branch| !branch.is_empty())
            .map(|branch| BranchTag {
                text: branch.to_owned(),
                direction: Direction::classify(branch),
            }),
    });

    let promoted_note = match (&team.promoted_from, team.show_promoted, team.no_description) {
        (Some(origin), true, false) => Some(format!(
            "проходит из: {} · {}",
            origin.round_name, origin.pack_title
        )),
        _ => None,
    };

    TeamCard {
        position,
        name: team.name.clone().unwrap_or_else(|| EMPTY_SLOT_LABEL.to_owned()),
        status,
        tags,
        promoted_note,
    }
}
