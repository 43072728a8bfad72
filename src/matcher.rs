use crate::normalizer::TraitVector;
use serde::Serialize;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum CareerCategory {
    Technology,
    Logistics,
    Creative,
    Administrative,
    Manufacturing,
}

/// Required trait level per dimension, 0..=10.
#[derive(Debug, Clone, Copy)]
pub struct TraitRequirements {
    pub visual: u8,
    pub logic: u8,
    pub memory: u8,
    pub speed: u8,
    pub focus: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct CareerProfile {
    pub id: &'static str,
    pub title: &'static str,
    pub category: CareerCategory,
    pub tags: &'static [&'static str],
    pub requirements: TraitRequirements,
    pub description: &'static str,
    /// Insight template; `{visual}`..`{focus}` expand to the user's 1..=10
    /// trait levels.
    pub insight_template: &'static str,
}

#[derive(Debug, Clone)]
pub struct CareerMatch {
    pub profile: &'static CareerProfile,
    pub match_score: u8,
    pub insight: String,
}

pub const PROFILE_TABLE: &[CareerProfile] = &[
    CareerProfile {
        id: "tech_labeler",
        title: "AI Data Labeler",
        category: CareerCategory::Technology,
        tags: &["Remote", "Detail-Oriented", "Visual"],
        requirements: TraitRequirements { visual: 9, logic: 5, memory: 4, speed: 7, focus: 8 },
        description: "Annotation and tagging of images and video to train machine learning models.",
        insight_template: "Exceptional visual processing ({visual}/10) lets you spot details the models miss.",
    },
    CareerProfile {
        id: "tech_qa",
        title: "Software QA Tester",
        category: CareerCategory::Technology,
        tags: &["Hybrid", "Logical", "Repetitive"],
        requirements: TraitRequirements { visual: 7, logic: 8, memory: 6, speed: 5, focus: 9 },
        description: "Execute test cases to find bugs in software applications. Requires patience and logic.",
        insight_template: "Clear logical thinking ({logic}/10) and deep focus help you uncover subtle software defects.",
    },
    CareerProfile {
        id: "tech_coder",
        title: "Backend Developer (Junior)",
        category: CareerCategory::Technology,
        tags: &["Remote", "Logical", "Deep Work"],
        requirements: TraitRequirements { visual: 4, logic: 9, memory: 8, speed: 5, focus: 8 },
        description: "Write and maintain server-side infrastructure. Ideal for pattern thinkers.",
        insight_template: "Strong sequence memory ({memory}/10) and algorithmic logic are the foundation of a good developer.",
    },
    CareerProfile {
        id: "log_packer",
        title: "Precision Packer",
        category: CareerCategory::Logistics,
        tags: &["Active", "Spatial", "Warehouse"],
        requirements: TraitRequirements { visual: 8, logic: 6, memory: 5, speed: 8, focus: 7 },
        description: "Efficiently pack goods ensuring safety and space optimization.",
        insight_template: "Processing speed ({speed}/10) and spatial reasoning make your packing fast and accurate.",
    },
    CareerProfile {
        id: "log_controller",
        title: "Inventory Controller",
        category: CareerCategory::Logistics,
        tags: &["Quiet Env", "Organized", "Memory"],
        requirements: TraitRequirements { visual: 6, logic: 7, memory: 9, speed: 5, focus: 8 },
        description: "Track stock levels and manage inventory databases.",
        insight_template: "Excellent working memory ({memory}/10) keeps item locations and counts at your fingertips.",
    },
    CareerProfile {
        id: "art_retoucher",
        title: "Photo Editor / Retoucher",
        category: CareerCategory::Creative,
        tags: &["Creative", "Visual", "Remote"],
        requirements: TraitRequirements { visual: 10, logic: 4, memory: 5, speed: 6, focus: 9 },
        description: "Enhance and retouch digital images with pixel-perfect precision.",
        insight_template: "An eagle eye ({visual}/10) lets you correct the smallest image details.",
    },
    CareerProfile {
        id: "art_3d_modeler",
        title: "3D Prop Modeler",
        category: CareerCategory::Creative,
        tags: &["Creative", "Spatial", "Hybrid"],
        requirements: TraitRequirements { visual: 9, logic: 7, memory: 6, speed: 5, focus: 7 },
        description: "Create 3D objects for games or architectural visualization.",
        insight_template: "The blend of spatial thinking ({visual}/10) and logic ({logic}/10) suits 3D design well.",
    },
    CareerProfile {
        id: "admin_data_entry",
        title: "Precision Data Entry",
        category: CareerCategory::Administrative,
        tags: &["Quiet Env", "Typing", "Routine"],
        requirements: TraitRequirements { visual: 6, logic: 5, memory: 4, speed: 9, focus: 8 },
        description: "Input data into systems with high speed and zero errors.",
        insight_template: "Sustained concentration ({focus}/10) makes you a remarkably efficient data-entry operator.",
    },
    CareerProfile {
        id: "admin_archivist",
        title: "Digital Archivist",
        category: CareerCategory::Administrative,
        tags: &["Quiet Env", "Organized", "History"],
        requirements: TraitRequirements { visual: 5, logic: 8, memory: 7, speed: 4, focus: 8 },
        description: "Organize and catalog digital records systematically.",
        insight_template: "Orderliness and classification skill ({logic}/10) help you manage vast record collections.",
    },
    CareerProfile {
        id: "mfg_assembler",
        title: "Micro-Electronics Assembler",
        category: CareerCategory::Manufacturing,
        tags: &["Hands-on", "Focus", "Detail"],
        requirements: TraitRequirements { visual: 8, logic: 5, memory: 6, speed: 6, focus: 10 },
        description: "Assemble tiny electronic components requiring steady hands and immense focus.",
        insight_template: "Deep focus ({focus}/10) is the key skill for assembling circuit components.",
    },
    CareerProfile {
        id: "mfg_qc",
        title: "Quality Control Inspector",
        category: CareerCategory::Manufacturing,
        tags: &["Factory", "Visual", "Compliance"],
        requirements: TraitRequirements { visual: 10, logic: 6, memory: 5, speed: 7, focus: 8 },
        description: "Inspect products for defects using visual aids and tools.",
        insight_template: "No flaw escapes you with a visual score of {visual}/10.",
    },
];

/// 0..=100 trait value to a 1..=10 level.
pub fn scale_to_ten(value: f32) -> u8 {
    (value / 10.0).round().clamp(1.0, 10.0) as u8
}

#[derive(Debug, Clone, Copy)]
struct UserLevels {
    visual: u8,
    logic: u8,
    memory: u8,
    speed: u8,
    focus: u8,
}

impl UserLevels {
    fn from_traits(traits: &TraitVector) -> Self {
        Self {
            visual: scale_to_ten(traits.visual),
            logic: scale_to_ten(traits.logic),
            memory: scale_to_ten(traits.memory),
            speed: scale_to_ten(traits.speed),
            focus: scale_to_ten(traits.focus),
        }
    }

    fn pairs(&self, req: &TraitRequirements) -> [(u8, u8); 5] {
        [
            (self.visual, req.visual),
            (self.logic, req.logic),
            (self.memory, req.memory),
            (self.speed, req.speed),
            (self.focus, req.focus),
        ]
    }
}

/// Deficit penalty for one dimension. Meeting the requirement costs
/// nothing; exceeding a low requirement earns nothing here either.
fn deficit(user: u8, required: u8) -> u32 {
    if user >= required {
        0
    } else {
        (required - user) as u32 * 2
    }
}

fn match_score(user: &UserLevels, req: &TraitRequirements) -> u8 {
    let total_deficit: u32 = user.pairs(req).iter().map(|&(u, r)| deficit(u, r)).sum();
    let mut score = 100i32 - total_deficit as i32 * 2;

    // Exceptional-strength bonus on any dimension where a demanding
    // requirement meets an outstanding user level.
    for (u, r) in user.pairs(req) {
        if u > 8 && r > 7 {
            score += 5;
        }
    }

    score.clamp(10, 99) as u8
}

fn render_insight(template: &str, user: &UserLevels) -> String {
    template
        .replace("{visual}", &user.visual.to_string())
        .replace("{logic}", &user.logic.to_string())
        .replace("{memory}", &user.memory.to_string())
        .replace("{speed}", &user.speed.to_string())
        .replace("{focus}", &user.focus.to_string())
}

/// Rank every profile against the trait vector and return the top three.
/// Ties keep table order.
pub fn find_top_matches(traits: &TraitVector) -> Vec<CareerMatch> {
    let user = UserLevels::from_traits(traits);

    let mut matches: Vec<CareerMatch> = PROFILE_TABLE
        .iter()
        .map(|profile| CareerMatch {
            profile,
            match_score: match_score(&user, &profile.requirements),
            insight: render_insight(profile.insight_template, &user),
        })
        .collect();

    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches.truncate(3);
    matches
}
