//! Static catalog of seed and fallback content.
//!
//! The catalog backs two contracts: it seeds a fresh installation with a
//! small demo inventory and a set of known traders, and it supplies the
//! deterministic fallbacks the content boundary uses when the remote
//! provider is unavailable (candidate items, stock images, a default reply).

use std::sync::OnceLock;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Category, Condition, Item, User};
use crate::types::{ItemId, UserId};

/// Greeting the counterpart opens every new chat with.
pub const GREETING: &str = "Hey! I'm interested in your item.";

/// Reply used when the content provider cannot produce one.
pub const DEFAULT_REPLY: &str = "I think that works for me!";

// ---------------------------------------------------------------------------
// Image pools
// ---------------------------------------------------------------------------

/// Curated stock image references per category.
pub fn image_pool(category: Category) -> &'static [&'static str] {
    match category {
        Category::Electronics => &[
            "https://images.unsplash.com/photo-1496181133206-80ce9b88a853?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1516035069371-29a1b244cc32?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1525547719571-a2d4ac8945e2?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1593642632823-8f78536788c6?auto=format&fit=crop&w=600&q=80",
        ],
        Category::Fashion => &[
            "https://images.unsplash.com/photo-1551028919-ac76c90b8565?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1542291026-7eec264c27ff?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1584917865442-de89df76afd3?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1591047139829-d91aecb6caea?auto=format&fit=crop&w=600&q=80",
        ],
        Category::Home => &[
            "https://images.unsplash.com/photo-1583847661441-89b750a694ef?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1555041469-a586c61ea9bc?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1513694203232-719a280e022f?auto=format&fit=crop&w=600&q=80",
        ],
        Category::Fitness => &[
            "https://images.unsplash.com/photo-1584735935682-2f2b69dff9d2?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1592194996308-7b43878e84a6?auto=format&fit=crop&w=600&q=80",
        ],
        Category::Books => &[
            "https://images.unsplash.com/photo-1512820790803-83ca734da794?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1544947950-fa07a98d237f?auto=format&fit=crop&w=600&q=80",
        ],
        Category::Gaming => &[
            "https://images.unsplash.com/photo-1552820728-8b83bb6b773f?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1593118247619-e7d6f2079219?auto=format&fit=crop&w=600&q=80",
        ],
        Category::Music => &[
            "https://images.unsplash.com/photo-1511379938547-c1f69419868d?auto=format&fit=crop&w=600&q=80",
            "https://images.unsplash.com/photo-1525711857929-42726519296f?auto=format&fit=crop&w=600&q=80",
        ],
        Category::Other => &[
            "https://images.unsplash.com/photo-1511556820780-d912e42b4980?auto=format&fit=crop&w=600&q=80",
        ],
    }
}

/// Deterministic stock image for a category. Pools are never empty, so this
/// always yields a usable reference.
pub fn fallback_image(category: Category) -> &'static str {
    image_pool(category)[0]
}

/// Random stock image for a category.
pub fn random_image<R: Rng + ?Sized>(category: Category, rng: &mut R) -> &'static str {
    image_pool(category)
        .choose(rng)
        .copied()
        .unwrap_or_else(|| fallback_image(category))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// The local user's profile.
pub fn local_user() -> &'static User {
    static LOCAL: OnceLock<User> = OnceLock::new();
    LOCAL.get_or_init(|| User {
        id: UserId::new(),
        name: "Alex Johnson".to_string(),
        avatar_url:
            "https://images.unsplash.com/photo-1535713875002-d1d0cf377fde?auto=format&fit=crop&w=300&q=80"
                .to_string(),
        rating: 4.9,
    })
}

/// The simulated counterpart traders. Identities are stable for the lifetime
/// of the process so generated items and offer snapshots agree on ownership.
pub fn known_traders() -> &'static [User] {
    static TRADERS: OnceLock<Vec<User>> = OnceLock::new();
    TRADERS.get_or_init(|| {
        vec![
            User {
                id: UserId::new(),
                name: "Alice".to_string(),
                avatar_url:
                    "https://images.unsplash.com/photo-1494790108377-be9c29b29330?auto=format&fit=crop&w=150&q=80"
                        .to_string(),
                rating: 4.8,
            },
            User {
                id: UserId::new(),
                name: "Bob".to_string(),
                avatar_url:
                    "https://images.unsplash.com/photo-1599566150163-29194dcaad36?auto=format&fit=crop&w=150&q=80"
                        .to_string(),
                rating: 4.5,
            },
            User {
                id: UserId::new(),
                name: "Charlie".to_string(),
                avatar_url:
                    "https://images.unsplash.com/photo-1535713875002-d1d0cf377fde?auto=format&fit=crop&w=150&q=80"
                        .to_string(),
                rating: 4.9,
            },
            User {
                id: UserId::new(),
                name: "Diana".to_string(),
                avatar_url:
                    "https://images.unsplash.com/photo-1580489944761-15a19d654956?auto=format&fit=crop&w=150&q=80"
                        .to_string(),
                rating: 4.7,
            },
        ]
    })
}

/// Look up a trader snapshot by id. Falls back to the first trader so offer
/// creation always has a counterpart profile to snapshot.
pub fn trader_by_id(id: UserId) -> &'static User {
    let traders = known_traders();
    traders.iter().find(|u| u.id == id).unwrap_or(&traders[0])
}

// ---------------------------------------------------------------------------
// Seed & fallback items
// ---------------------------------------------------------------------------

/// Demo inventory a fresh installation starts with.
pub fn seed_inventory() -> Vec<Item> {
    let me = local_user().id;
    vec![
        Item {
            id: ItemId::new(),
            owner_id: me,
            title: "Vintage Film Camera".to_string(),
            description: "Canon AE-1 in working condition with 50mm lens.".to_string(),
            category: Category::Electronics,
            images: vec![
                "https://images.unsplash.com/photo-1516035069371-29a1b244cc32?auto=format&fit=crop&w=600&q=80"
                    .to_string(),
            ],
            condition: Condition::Good,
            estimated_value: 150.0,
        },
        Item {
            id: ItemId::new(),
            owner_id: me,
            title: "Leather Jacket".to_string(),
            description: "Genuine leather biker jacket, size M. Barely worn.".to_string(),
            category: Category::Fashion,
            images: vec![
                "https://images.unsplash.com/photo-1551028919-ac76c90b8565?auto=format&fit=crop&w=600&q=80"
                    .to_string(),
            ],
            condition: Condition::LikeNew,
            estimated_value: 200.0,
        },
    ]
}

/// Deterministic synthetic candidates for a category.
///
/// This is what the content boundary serves when the remote provider fails
/// or is not configured. Content varies only with `category` and position,
/// never with any random source.
pub fn fallback_items(category: Category, count: usize) -> Vec<Item> {
    let traders = known_traders();
    let pool = image_pool(category);
    (0..count)
        .map(|i| Item {
            id: ItemId::new(),
            owner_id: traders[i % traders.len()].id,
            title: format!("{} Find #{}", category, i + 1),
            description: "Local listing. Details available on request.".to_string(),
            category,
            images: vec![pool[i % pool.len()].to_string()],
            condition: Condition::Good,
            estimated_value: 50.0 + 25.0 * i as f64,
        })
        .collect()
}
