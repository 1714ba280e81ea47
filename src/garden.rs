// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Zen garden and meditation tracking

use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::timeline;
use crate::{NeuroSyncError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandPattern {
    #[default]
    Waves,
    Lines,
    Circles,
}

impl SandPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            SandPattern::Waves => "waves",
            SandPattern::Lines => "lines",
            SandPattern::Circles => "circles",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoneKind {
    Round,
    Rough,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantKind {
    Bonsai,
    Bamboo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationKind {
    Lantern,
    Bridge,
}

/// Positions are percentages of the garden's width and height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stone {
    pub x: u8,
    pub y: u8,
    pub size: u32,
    #[serde(rename = "type")]
    pub kind: StoneKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    pub x: u8,
    pub y: u8,
    #[serde(rename = "type")]
    pub kind: PlantKind,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub x: u8,
    pub y: u8,
    #[serde(rename = "type")]
    pub kind: DecorationKind,
}

/// Something that can be placed in the garden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "lowercase")]
pub enum GardenItem {
    Stone(Stone),
    Plant(Plant),
    Decoration(Decoration),
}

impl GardenItem {
    fn position(&self) -> (u8, u8) {
        match self {
            GardenItem::Stone(s) => (s.x, s.y),
            GardenItem::Plant(p) => (p.x, p.y),
            GardenItem::Decoration(d) => (d.x, d.y),
        }
    }
}

fn check_position((x, y): (u8, u8)) -> Result<()> {
    if x > 100 || y > 100 {
        return Err(NeuroSyncError::Validation(format!(
            "position ({}, {}) is outside the garden",
            x, y
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationSession {
    pub date: NaiveDate,
    /// Local time the session was recorded, `HH:MM`
    pub time: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: String,
}

/// Replacement layout submitted from the garden editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenLayout {
    #[serde(default)]
    pub sand_pattern: SandPattern,
    #[serde(default)]
    pub stones: Vec<Stone>,
    #[serde(default)]
    pub plants: Vec<Plant>,
    #[serde(default)]
    pub decorations: Vec<Decoration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZenGarden {
    pub sand_pattern: SandPattern,
    pub stones: Vec<Stone>,
    pub plants: Vec<Plant>,
    pub decorations: Vec<Decoration>,
    pub last_modified: NaiveDate,
    #[serde(default)]
    pub meditation_sessions: Vec<MeditationSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeditationStats {
    pub total_sessions: usize,
    pub total_minutes: u32,
    pub longest_session: u32,
    /// Mean minutes per session, one decimal place
    pub average_duration: f64,
    pub streak_days: u32,
    pub last_session: Option<NaiveDate>,
}

impl ZenGarden {
    /// Starter garden for a new user
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            sand_pattern: SandPattern::Waves,
            stones: vec![
                Stone { x: 30, y: 40, size: 15, kind: StoneKind::Round },
                Stone { x: 70, y: 60, size: 20, kind: StoneKind::Rough },
                Stone { x: 50, y: 20, size: 10, kind: StoneKind::Flat },
            ],
            plants: vec![
                Plant { x: 20, y: 70, kind: PlantKind::Bonsai, size: 20 },
                Plant { x: 80, y: 30, kind: PlantKind::Bamboo, size: 15 },
            ],
            decorations: vec![
                Decoration { x: 90, y: 90, kind: DecorationKind::Lantern },
                Decoration { x: 10, y: 10, kind: DecorationKind::Bridge },
            ],
            last_modified: today,
            meditation_sessions: Vec::new(),
        }
    }

    pub fn record_session(
        &mut self,
        duration_minutes: u32,
        notes: &str,
        now: NaiveDateTime,
    ) -> Result<&MeditationSession> {
        if duration_minutes == 0 {
            return Err(NeuroSyncError::Validation(
                "meditation duration must be at least one minute".to_string(),
            ));
        }

        self.meditation_sessions.push(MeditationSession {
            date: now.date(),
            time: now.format("%H:%M").to_string(),
            duration_minutes,
            notes: notes.trim().to_string(),
        });
        self.last_modified = now.date();
        tracing::debug!("Recorded {} minute meditation", duration_minutes);

        Ok(&self.meditation_sessions[self.meditation_sessions.len() - 1])
    }

    pub fn set_sand_pattern(&mut self, pattern: SandPattern, today: NaiveDate) {
        self.sand_pattern = pattern;
        self.last_modified = today;
    }

    pub fn place(&mut self, item: GardenItem, today: NaiveDate) -> Result<()> {
        check_position(item.position())?;
        match item {
            GardenItem::Stone(s) => self.stones.push(s),
            GardenItem::Plant(p) => self.plants.push(p),
            GardenItem::Decoration(d) => self.decorations.push(d),
        }
        self.last_modified = today;
        Ok(())
    }

    /// Replace the layout; meditation history is kept
    pub fn apply_layout(&mut self, layout: GardenLayout, today: NaiveDate) -> Result<()> {
        let positions = layout
            .stones
            .iter()
            .map(|s| (s.x, s.y))
            .chain(layout.plants.iter().map(|p| (p.x, p.y)))
            .chain(layout.decorations.iter().map(|d| (d.x, d.y)));
        for position in positions {
            check_position(position)?;
        }

        self.sand_pattern = layout.sand_pattern;
        self.stones = layout.stones;
        self.plants = layout.plants;
        self.decorations = layout.decorations;
        self.last_modified = today;
        Ok(())
    }

    pub fn meditation_stats(&self, today: NaiveDate) -> MeditationStats {
        let sessions = &self.meditation_sessions;
        let total_minutes: u32 = sessions.iter().map(|s| s.duration_minutes).sum();
        let average_duration = if sessions.is_empty() {
            0.0
        } else {
            (total_minutes as f64 / sessions.len() as f64 * 10.0).round_ties_even() / 10.0
        };

        MeditationStats {
            total_sessions: sessions.len(),
            total_minutes,
            longest_session: sessions.iter().map(|s| s.duration_minutes).max().unwrap_or(0),
            average_duration,
            streak_days: meditation_streak(sessions.iter().map(|s| s.date), today),
            last_session: sessions.iter().map(|s| s.date).max(),
        }
    }
}

/// Consecutive days ending at the latest session; 0 once a full day is missed
fn meditation_streak(dates: impl IntoIterator<Item = NaiveDate>, today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = dates.into_iter().collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let Some(&latest) = days.first() else {
        return 0;
    };
    if (today - latest).num_days() > 1 {
        return 0;
    }
    timeline::consecutive_run(&days)
}

const ZEN_QUOTES: [&str; 20] = [
    "The obstacle is the path.",
    "When you reach the top of the mountain, keep climbing.",
    "Before enlightenment, chop wood, carry water. After enlightenment, chop wood, carry water.",
    "The quieter you become, the more you can hear.",
    "Wherever you are, be there totally.",
    "When thoughts arise, then do all things arise. When thoughts vanish, then do all things vanish.",
    "Where there are humans, you'll find flies. And Buddhas.",
    "Only the hand that erases can write the true thing.",
    "Life is a journey. Time is a river. The door is ajar.",
    "The mind is everything. What you think you become.",
    "No snowflake ever falls in the wrong place.",
    "When you try to stay on the surface of the water, you sink; but when you try to sink, you float.",
    "The true miracle is not walking on water or walking in air, but simply walking on this earth.",
    "Zen is not some kind of excitement, but concentration on our usual everyday routine.",
    "To seek is to suffer. To seek nothing is bliss.",
    "Sleep is the best meditation.",
    "Before you speak, let your words pass through three gates: Is it true? Is it necessary? Is it kind?",
    "No one saves us but ourselves. No one can and no one may. We ourselves must walk the path.",
    "Every morning we are born again. What we do today matters most.",
    "If the problem can be solved, why worry? If the problem cannot be solved, worrying will do you no good.",
];

pub fn zen_wisdom<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    ZEN_QUOTES[rng.gen_range(0..ZEN_QUOTES.len())]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeditationFocus {
    #[default]
    Breath,
    Body,
    Compassion,
}

impl MeditationFocus {
    /// Case-insensitive; unknown names fall back to breath
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "body" => MeditationFocus::Body,
            "compassion" => MeditationFocus::Compassion,
            _ => MeditationFocus::Breath,
        }
    }
}

struct Script {
    title: &'static str,
    intro: &'static str,
    instructions: [&'static str; 6],
    closing: &'static str,
}

fn script(focus: MeditationFocus) -> Script {
    match focus {
        MeditationFocus::Breath => Script {
            title: "Mindful Breathing",
            intro: "This meditation focuses on using the breath as an anchor for awareness.",
            instructions: [
                "Find a comfortable seated position with your back straight but not rigid.",
                "Close your eyes or maintain a soft gaze.",
                "Take a few deep breaths, then allow your breathing to return to its natural rhythm.",
                "Focus your attention on the sensation of breathing - the air moving in and out, the rising and falling of your chest or abdomen.",
                "When your mind wanders, gently recognize this and return your focus to your breath without judgment.",
                "Continue this practice, returning to your breath each time your attention drifts.",
            ],
            closing: "As this meditation comes to a close, gradually expand your awareness to the space around you, and when you're ready, gently open your eyes.",
        },
        MeditationFocus::Body => Script {
            title: "Body Scan Meditation",
            intro: "This practice helps you develop awareness of physical sensations throughout your body.",
            instructions: [
                "Lie down or sit in a comfortable position where you can remain still.",
                "Close your eyes and bring awareness to your body as a whole.",
                "Begin at your feet, noticing any sensations present without trying to change them.",
                "Slowly move your attention upward through your legs, torso, arms, and head.",
                "Pay particular attention to areas of tension or discomfort, breathing into them with acceptance.",
                "If your mind wanders, gently bring it back to the part of the body you were focusing on.",
            ],
            closing: "Take a final deep breath, feeling your entire body, and bring gentle movement back to your fingers and toes before opening your eyes.",
        },
        MeditationFocus::Compassion => Script {
            title: "Loving-Kindness Meditation",
            intro: "This meditation cultivates feelings of goodwill, kindness, and compassion toward yourself and others.",
            instructions: [
                "Sit comfortably with your eyes closed and take a few deep breaths.",
                "Begin by directing kind thoughts toward yourself: 'May I be happy. May I be healthy. May I be safe. May I live with ease.'",
                "Next, bring to mind someone you care about deeply and extend these same wishes to them.",
                "Continue expanding this circle of compassion to include friends, neutral acquaintances, difficult people, and eventually all beings.",
                "Notice any resistance that arises without judgment, and return to the phrases.",
                "Feel the warmth of compassion spreading throughout your body and mind.",
            ],
            closing: "As you prepare to end this practice, know that you can return to these feelings of loving-kindness anytime throughout your day.",
        },
    }
}

/// Markdown script for a guided meditation
pub fn guided_meditation_text(duration_minutes: u32, focus: MeditationFocus) -> String {
    let script = script(focus);
    let mut text = format!(
        "# {} ({} minutes)\n\n## Introduction\n{}\n\n## Instructions\n",
        script.title, duration_minutes, script.intro
    );
    for (i, instruction) in script.instructions.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, instruction));
    }
    text.push_str("\n## Closing\n");
    text.push_str(script.closing);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_default_garden() {
        let garden = ZenGarden::default_for(day("2024-03-10"));
        assert_eq!(garden.stones.len(), 3);
        assert_eq!(garden.plants.len(), 2);
        assert_eq!(garden.decorations.len(), 2);

        let json = serde_json::to_value(&garden).unwrap();
        assert_eq!(json["sand_pattern"], "waves");
        assert_eq!(json["stones"][1]["type"], "rough");
        assert_eq!(json["last_modified"], "2024-03-10");
    }

    #[test]
    fn test_empty_stats() {
        let stats = ZenGarden::default_for(day("2024-03-10")).meditation_stats(day("2024-03-10"));
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.streak_days, 0);
        assert_eq!(stats.last_session, None);
        assert_eq!(stats.average_duration, 0.0);
    }

    #[test]
    fn test_record_and_stats() {
        let mut garden = ZenGarden::default_for(day("2024-03-01"));
        garden.record_session(5, "", at("2024-03-08 07:30")).unwrap();
        garden.record_session(10, "", at("2024-03-09 21:05")).unwrap();
        let session = garden.record_session(20, "  felt settled ", at("2024-03-10 06:45")).unwrap();
        assert_eq!(session.time, "06:45");
        assert_eq!(session.notes, "felt settled");
        garden.record_session(5, "", at("2024-03-10 22:00")).unwrap();

        let stats = garden.meditation_stats(day("2024-03-10"));
        assert_eq!(stats.total_sessions, 4);
        assert_eq!(stats.total_minutes, 40);
        assert_eq!(stats.longest_session, 20);
        assert_eq!(stats.average_duration, 10.0);
        assert_eq!(stats.streak_days, 3);
        assert_eq!(stats.last_session, Some(day("2024-03-10")));
        assert_eq!(garden.last_modified, day("2024-03-10"));
    }

    #[test]
    fn test_streak_rules() {
        let mut garden = ZenGarden::default_for(day("2024-03-01"));
        garden.record_session(10, "", at("2024-03-09 08:00")).unwrap();

        // single session yesterday still counts
        assert_eq!(garden.meditation_stats(day("2024-03-10")).streak_days, 1);
        // two days later the streak is broken
        assert_eq!(garden.meditation_stats(day("2024-03-11")).streak_days, 0);

        garden.record_session(10, "", at("2024-03-06 08:00")).unwrap();
        assert_eq!(garden.meditation_stats(day("2024-03-09")).streak_days, 1);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let mut garden = ZenGarden::default_for(day("2024-03-01"));
        for minutes in [5, 5, 6] {
            garden.record_session(minutes, "", at("2024-03-01 08:00")).unwrap();
        }
        assert_eq!(garden.meditation_stats(day("2024-03-01")).average_duration, 5.3);
    }

    #[test]
    fn test_zero_minutes_rejected() {
        let mut garden = ZenGarden::default_for(day("2024-03-01"));
        assert!(garden.record_session(0, "", at("2024-03-01 08:00")).is_err());
        assert!(garden.meditation_sessions.is_empty());
    }

    #[test]
    fn test_place_and_layout() {
        let mut garden = ZenGarden::default_for(day("2024-03-01"));
        let item: GardenItem = serde_json::from_str(
            r#"{"item": "stone", "x": 10, "y": 90, "size": 12, "type": "flat"}"#,
        )
        .unwrap();
        garden.place(item, day("2024-03-02")).unwrap();
        assert_eq!(garden.stones.len(), 4);
        assert_eq!(garden.last_modified, day("2024-03-02"));

        let outside = GardenItem::Decoration(Decoration { x: 120, y: 5, kind: DecorationKind::Lantern });
        assert!(matches!(
            garden.place(outside, day("2024-03-02")),
            Err(NeuroSyncError::Validation(_))
        ));

        garden.record_session(5, "", at("2024-03-02 08:00")).unwrap();
        let layout: GardenLayout = serde_json::from_str(r#"{"sand_pattern": "circles"}"#).unwrap();
        garden.apply_layout(layout, day("2024-03-03")).unwrap();
        assert_eq!(garden.sand_pattern, SandPattern::Circles);
        assert!(garden.stones.is_empty());
        assert_eq!(garden.meditation_sessions.len(), 1);

        garden.set_sand_pattern(SandPattern::Lines, day("2024-03-04"));
        assert_eq!(garden.sand_pattern.as_str(), "lines");
    }

    #[test]
    fn test_wisdom_is_from_collection() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            assert!(ZEN_QUOTES.contains(&zen_wisdom(&mut rng)));
        }
    }

    #[test]
    fn test_guided_meditation() {
        let text = guided_meditation_text(10, MeditationFocus::parse("Body"));
        assert!(text.starts_with("# Body Scan Meditation (10 minutes)\n\n## Introduction\n"));
        assert!(text.contains("\n6. If your mind wanders"));
        assert!(text.ends_with("before opening your eyes."));

        let fallback = guided_meditation_text(5, MeditationFocus::parse("walking"));
        assert!(fallback.starts_with("# Mindful Breathing (5 minutes)"));
    }
}
