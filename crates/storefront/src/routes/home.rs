//! Landing page route handler.
//!
//! Hero slides and categories are static configuration; services and top
//! sellers come from the commerce API with static fallbacks, so a backend
//! outage degrades the page instead of breaking it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use mashtal_core::{CategoryId, ServiceId, parse_amount};

use crate::commerce::{Service, TopProduct};
use crate::filters;
use crate::i18n::{Locale, Messages};
use crate::state::AppState;

// =============================================================================
// Hero Configuration (static content for the slideshow)
// =============================================================================

/// A single slide in the hero slideshow, both locales.
struct HeroSlide {
    title_en: &'static str,
    title_ar: &'static str,
    subtitle_en: &'static str,
    subtitle_ar: &'static str,
    image_path: &'static str,
}

const HERO_SLIDES: [HeroSlide; 3] = [
    HeroSlide {
        title_en: "Everything Your Garden Needs",
        title_ar: "كل ما تحتاجه حديقتك",
        subtitle_en: "Seedlings, tools, and soil delivered to your door",
        subtitle_ar: "شتلات وأدوات وتربة حتى باب بيتك",
        image_path: "/static/images/hero/greenhouse.jpg",
    },
    HeroSlide {
        title_en: "Grown With Care",
        title_ar: "مزروعة بعناية",
        subtitle_en: "Local nursery stock, acclimatized and healthy",
        subtitle_ar: "شتلات محلية مُقسّاة وصحية",
        image_path: "/static/images/hero/seedlings.jpg",
    },
    HeroSlide {
        title_en: "Advice From Agronomists",
        title_ar: "نصائح من مهندسين زراعيين",
        subtitle_en: "Get expert help picking the right plants",
        subtitle_ar: "احصل على مساعدة الخبراء لاختيار النباتات المناسبة",
        image_path: "/static/images/hero/consultation.jpg",
    },
];

/// A product category tile, both locales.
struct CategoryEntry {
    id: CategoryId,
    name_en: &'static str,
    name_ar: &'static str,
    image_path: &'static str,
}

const CATEGORIES: [CategoryEntry; 5] = [
    CategoryEntry {
        id: CategoryId::new(1),
        name_en: "Indoor Plants",
        name_ar: "نباتات داخلية",
        image_path: "/static/images/categories/indoor.svg",
    },
    CategoryEntry {
        id: CategoryId::new(2),
        name_en: "Fruit Trees",
        name_ar: "أشجار مثمرة",
        image_path: "/static/images/categories/trees.svg",
    },
    CategoryEntry {
        id: CategoryId::new(3),
        name_en: "Seeds",
        name_ar: "بذور",
        image_path: "/static/images/categories/seeds.svg",
    },
    CategoryEntry {
        id: CategoryId::new(4),
        name_en: "Tools",
        name_ar: "أدوات",
        image_path: "/static/images/categories/tools.svg",
    },
    CategoryEntry {
        id: CategoryId::new(5),
        name_en: "Fertilizers",
        name_ar: "أسمدة",
        image_path: "/static/images/categories/fertilizer.svg",
    },
];

/// Fallback services shown when the API has none to offer.
fn fallback_services() -> Vec<Service> {
    vec![
        Service {
            id: ServiceId::new(1),
            name_en: "Tree and Plant Care".to_string(),
            name_ar: "العناية بالأشجار والنباتات".to_string(),
            description_en:
                "Full care services for trees and plants to help them grow healthy and beautiful."
                    .to_string(),
            description_ar: "خدمات متكاملة للعناية بالأشجار والنباتات لضمان نموها بشكل صحي وجميل."
                .to_string(),
            image: Some("/static/images/services/care.jpg".to_string()),
        },
        Service {
            id: ServiceId::new(2),
            name_en: "Agricultural Consultations".to_string(),
            name_ar: "الاستشارات الزراعية".to_string(),
            description_en: "Expert advice from agricultural engineers to improve plant care."
                .to_string(),
            description_ar:
                "توجيهات ونصائح مهنية من مهندسين زراعيين مختصين لتحسين العناية بالنباتات."
                    .to_string(),
            image: Some("/static/images/services/consultation.jpg".to_string()),
        },
        Service {
            id: ServiceId::new(3),
            name_en: "Garden Landscaping".to_string(),
            name_ar: "تنسيق الحدائق".to_string(),
            description_en:
                "Designing and organizing small gardens with high quality to improve their look."
                    .to_string(),
            description_ar:
                "تصميم وتنظيم الحدائق الصغيرة بأعلى جودة لتحسين مظهرها واستخدام المساحات."
                    .to_string(),
            image: Some("/static/images/services/landscaping.jpg".to_string()),
        },
    ]
}

// =============================================================================
// View Types
// =============================================================================

/// Hero slide display data.
pub struct HeroSlideView {
    pub title: String,
    pub subtitle: String,
    pub image_path: String,
}

/// Service card display data.
pub struct ServiceView {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub url: String,
}

/// Product card display data.
pub struct ProductView {
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub url: String,
}

/// Category tile display data.
pub struct CategoryView {
    pub name: String,
    pub image_path: String,
    pub url: String,
}

/// Maximum service description length before truncation.
const MAX_DESCRIPTION_LEN: usize = 150;

/// Number of services shown on the landing page.
const SERVICES_SHOWN: usize = 3;

/// Truncate a description to a display length.
fn trim_description(description: &str) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_LEN {
        return description.to_string();
    }
    let trimmed: String = description.chars().take(MAX_DESCRIPTION_LEN - 3).collect();
    format!("{trimmed}...")
}

/// Format a backend price string for display.
fn format_price(raw: &str, locale: Locale) -> String {
    parse_amount(raw).map_or_else(
        || raw.to_string(),
        |amount| match locale {
            Locale::En => format!("{amount:.2} JOD"),
            Locale::Ar => format!("{amount:.2} د.أ"),
        },
    )
}

impl ServiceView {
    fn build(service: &Service, locale: Locale) -> Self {
        Self {
            name: service.name(locale).to_string(),
            description: trim_description(service.description(locale)),
            image: service.image.clone(),
            url: format!("/{locale}/services/{}", service.id),
        }
    }
}

impl ProductView {
    fn build(product: &TopProduct, locale: Locale) -> Self {
        Self {
            name: product.name(locale).to_string(),
            price: format_price(&product.price, locale),
            image: product.image.clone(),
            url: format!("/{locale}/products/{}", product.id),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub locale: Locale,
    pub t: &'static Messages,
    pub hero_slides: Vec<HeroSlideView>,
    pub services: Vec<ServiceView>,
    pub top_products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
}

/// Redirect `/` to the default locale.
pub async fn root_redirect() -> Redirect {
    Redirect::to("/ar")
}

/// Display the landing page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>, Path(locale): Path<Locale>) -> impl IntoResponse {
    // Fetch services, falling back to static content on error or empty
    let services = match state.commerce().get_services().await {
        Ok(services) if !services.is_empty() => services,
        Ok(_) => fallback_services(),
        Err(e) => {
            tracing::error!("Failed to fetch services: {e}");
            fallback_services()
        }
    };

    // Fetch top sellers; an outage leaves the section empty
    let top_products = state.commerce().get_top_products().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch top products: {e}");
            Vec::new()
        },
        |products| products,
    );

    HomeTemplate {
        locale,
        t: Messages::for_locale(locale),
        hero_slides: HERO_SLIDES
            .iter()
            .map(|slide| match locale {
                Locale::En => HeroSlideView {
                    title: slide.title_en.to_string(),
                    subtitle: slide.subtitle_en.to_string(),
                    image_path: slide.image_path.to_string(),
                },
                Locale::Ar => HeroSlideView {
                    title: slide.title_ar.to_string(),
                    subtitle: slide.subtitle_ar.to_string(),
                    image_path: slide.image_path.to_string(),
                },
            })
            .collect(),
        services: services
            .iter()
            .take(SERVICES_SHOWN)
            .map(|service| ServiceView::build(service, locale))
            .collect(),
        top_products: top_products
            .iter()
            .map(|product| ProductView::build(product, locale))
            .collect(),
        categories: CATEGORIES
            .iter()
            .map(|category| CategoryView {
                name: match locale {
                    Locale::En => category.name_en.to_string(),
                    Locale::Ar => category.name_ar.to_string(),
                },
                image_path: category.image_path.to_string(),
                url: format!("/{locale}/categories/{}", category.id),
            })
            .collect(),
    }
}
