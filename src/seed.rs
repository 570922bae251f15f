//! Named default data sets.
//!
//! These are what a fresh install starts with, and what any collection falls
//! back to when its stored value is missing or corrupt. They double as the
//! acceptance fixture for tests that start from scratch.

use crate::model::{AdminUser, Branding, Category, Sections, Story};
use crate::permissions::Role;

/// Site name used until branding is customised.
pub const DEFAULT_SITE_NAME: &str = "AFTER®";

pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("burnout", "Burnout"),
        Category::new("loss", "Loss"),
        Category::new("starting-over", "Starting Over"),
        Category::new("quiet-days", "Quiet Days"),
    ]
}

/// Starter stories. All are published and have empty galleries.
pub fn default_stories() -> Vec<Story> {
    let story = |id: &str, title: &str, summary: &str, category: &str, sections: [&str; 4]| {
        let [slipped, harder, helped, today] = sections;
        Story {
            id: id.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            category: category.to_string(),
            image: String::new(),
            sections: Sections {
                slipped: slipped.to_string(),
                harder: harder.to_string(),
                helped: helped.to_string(),
                today: today.to_string(),
            },
            gallery: Vec::new(),
            is_published: true,
        }
    };

    vec![
        story(
            "1",
            "The Year Everything Was Urgent",
            "A planner who stopped being able to plan, and what came after.",
            "burnout",
            [
                "Every day felt like catching up on the day before.",
                "I was good at hiding it, so nobody asked.",
                "A friend who sat with me without fixing anything.",
                "I keep one evening a week entirely empty.",
            ],
        ),
        story(
            "2",
            "Setting the Table for Two",
            "Learning to cook for one person again after a long marriage.",
            "loss",
            [
                "The house went quiet in a way I had never heard before.",
                "Holidays arrived on schedule whether I was ready or not.",
                "A cooking class where nobody knew my history.",
                "Some days are still heavy. Most are ordinary, and that is fine.",
            ],
        ),
        story(
            "3",
            "Moving Back Home at Thirty-Four",
            "Leaving a city, a job and a version of myself.",
            "starting-over",
            [
                "The plan I had built my twenties around stopped making sense.",
                "Explaining it to people who only saw the outside.",
                "Walking the same route every morning until it felt like mine.",
                "I am building something smaller, and it fits.",
            ],
        ),
    ]
}

/// One starter account per role.
pub fn default_accounts() -> Vec<AdminUser> {
    vec![
        AdminUser {
            id: "1".into(),
            role: Role::Admin,
            password: "admin@after".into(),
            label: "Primary Admin".into(),
        },
        AdminUser {
            id: "2".into(),
            role: Role::Editor,
            password: "editor123".into(),
            label: "Content Team".into(),
        },
        AdminUser {
            id: "3".into(),
            role: Role::Approver,
            password: "approver123".into(),
            label: "Curator".into(),
        },
    ]
}

pub fn default_branding() -> Branding {
    Branding {
        site_name: DEFAULT_SITE_NAME.to_string(),
        logo_url: None,
        promo_video_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_stories_reference_seed_categories() {
        let ids: HashSet<String> = default_categories().into_iter().map(|c| c.id).collect();
        for story in default_stories() {
            assert!(ids.contains(&story.category), "{} is orphaned", story.id);
        }
    }

    #[test]
    fn seed_stories_are_published_without_gallery() {
        for story in default_stories() {
            assert!(story.is_published);
            assert!(story.gallery.is_empty());
        }
    }

    #[test]
    fn one_account_per_role() {
        let roles: Vec<Role> = default_accounts().iter().map(|a| a.role).collect();
        assert_eq!(roles, vec![Role::Admin, Role::Editor, Role::Approver]);
    }

    #[test]
    fn seed_ids_are_unique() {
        let stories = default_stories();
        let ids: HashSet<&str> = stories.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), stories.len());
    }
}
