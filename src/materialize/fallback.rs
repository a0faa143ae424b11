//! Per-field pools for display fields the source row leaves empty.

use rand::Rng;
use rand::seq::SliceRandom;

use super::record::{DisplayRecord, PartialRecord};

pub const BENEFITS_POOL: &[&[&str]] = &[
    &["Remote work", "Health insurance", "401k", "Stock options", "Flexible hours"],
    &["Competitive salary", "Health benefits", "Professional development"],
    &["Health insurance", "Dental coverage", "Vision care", "Professional growth"],
    &["Creative freedom", "Flexible schedule", "Remote options"],
    &["Health benefits", "Student loan assistance", "Remote work"],
];

pub const DESCRIPTION_POOL: &[&str] = &[
    "Join our innovative team building cutting-edge products used by thousands of customers.",
    "Help us grow a sustainable business through data-driven decisions.",
    "Work with a small, focused team that ships quickly and learns constantly.",
    "Build reliable systems that scale with a fast-growing customer base.",
    "Shape the product roadmap alongside experienced founders.",
];

pub const LOGO_POOL: &[&str] = &["🚀", "🌱", "🏥", "💰", "💼", "🎨", "📚", "📦"];

pub const SALARY_POOL: &[&str] = &[
    "$60,000 - $80,000",
    "$80,000 - $100,000",
    "$90,000 - $120,000",
    "$110,000 - $140,000",
    "$120,000 - $150,000",
];

pub const SIZE_POOL: &[&str] = &[
    "1-50 employees",
    "50-200 employees",
    "200-500 employees",
    "500-1000 employees",
    "1000-5000 employees",
];

pub const TYPE_POOL: &[&str] = &["Full-time", "Part-time", "Contract", "Internship"];

pub const POSTED_POOL: &[&str] = &[
    "recently",
    "1 day ago",
    "2 days ago",
    "3 days ago",
    "5 days ago",
    "1 week ago",
];

pub const EXPERIENCE_POOL: &[[u32; 2]] = &[[0, 2], [1, 3], [2, 4], [3, 5], [5, 7]];

pub const SKILLS_POOL: &[[&str; 3]] = &[
    ["Communication", "Teamwork", "Problem solving"],
    ["Python", "SQL", "Data analysis"],
    ["JavaScript", "React", "Node.js"],
    ["Project management", "Agile", "Stakeholder management"],
    ["Excel", "Financial modeling", "Reporting"],
];

pub const RATING_POOL: &[f64] = &[3.0, 4.0, 5.0];

/// Completes `partial`, drawing every empty optional field from its pool.
///
/// Each call draws fresh values, so the same partial record can complete
/// differently on every call.
pub fn fill_fallbacks<R: Rng + ?Sized>(partial: PartialRecord, rng: &mut R) -> DisplayRecord {
    DisplayRecord {
        id: partial.id,
        name: partial.name,
        position: partial.position,
        industry: partial.industry,
        founded: partial.founded,
        size: partial.size.unwrap_or_else(|| pick(SIZE_POOL, rng).to_string()),
        rating: partial.rating.unwrap_or_else(|| *pick(RATING_POOL, rng)),
        location: partial.location,
        benefits: partial
            .benefits
            .unwrap_or_else(|| owned(pick(BENEFITS_POOL, rng).iter())),
        created_at: partial.created_at,
        description: partial
            .description
            .unwrap_or_else(|| pick(DESCRIPTION_POOL, rng).to_string()),
        experience: partial
            .experience
            .unwrap_or_else(|| *pick(EXPERIENCE_POOL, rng)),
        logo: partial.logo.unwrap_or_else(|| pick(LOGO_POOL, rng).to_string()),
        posted: partial
            .posted
            .unwrap_or_else(|| pick(POSTED_POOL, rng).to_string()),
        salary: partial
            .salary
            .unwrap_or_else(|| pick(SALARY_POOL, rng).to_string()),
        skills: partial
            .skills
            .unwrap_or_else(|| owned(pick(SKILLS_POOL, rng).iter())),
        job_type: partial
            .job_type
            .unwrap_or_else(|| pick(TYPE_POOL, rng).to_string()),
        ai_score: partial.ai_score,
    }
}

fn pick<'a, T, R: Rng + ?Sized>(pool: &'a [T], rng: &mut R) -> &'a T {
    // Pools are non-empty constants.
    pool.choose(rng).unwrap_or(&pool[0])
}

fn owned<'a>(items: impl Iterator<Item = &'a &'a str>) -> Vec<String> {
    items.map(|s| s.to_string()).collect()
}
