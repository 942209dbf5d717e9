//! Localization support.
//!
//! The storefront serves English and Arabic under locale-prefixed routes
//! (`/en/...`, `/ar/...`). Arabic is the default: an unrecognized locale
//! segment resolves to Arabic rather than rejecting the request.
//!
//! User-facing strings live in a static [`Messages`] catalog per locale,
//! looked up once per request and handed to templates and the checkout
//! validator.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Supported storefront locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    En,
    #[default]
    Ar,
}

impl Locale {
    /// The URL path segment and `lang` attribute value.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// Text direction for the `dir` attribute.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::En => "ltr",
            Self::Ar => "rtl",
        }
    }

    /// Resolve a path segment to a locale. Anything that is not exactly
    /// `en` is Arabic.
    #[must_use]
    pub fn resolve(segment: &str) -> Self {
        if segment == "en" { Self::En } else { Self::Ar }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let segment = String::deserialize(deserializer)?;
        Ok(Self::resolve(&segment))
    }
}

/// Static per-locale string catalog.
///
/// Grouped loosely by page; validation messages are the exact strings the
/// checkout validator attaches to fields.
#[derive(Debug)]
pub struct Messages {
    // Checkout
    pub confirm: &'static str,
    pub processing: &'static str,
    pub success: &'static str,
    pub thank_you: &'static str,
    pub order_summary: &'static str,
    pub order_id: &'static str,
    pub quantity: &'static str,
    pub total: &'static str,
    pub delivery: &'static str,
    pub discount: &'static str,
    pub continue_shopping: &'static str,
    pub support: &'static str,
    pub contact_support: &'static str,

    // Checkout validation errors
    pub gift_first_name_required: &'static str,
    pub gift_last_name_required: &'static str,
    pub invalid_gift_phone: &'static str,
    pub invalid_card_number: &'static str,
    pub card_holder_required: &'static str,
    pub invalid_expiry_date: &'static str,
    pub expired_card: &'static str,
    pub invalid_cvv: &'static str,
    pub address_incomplete: &'static str,
    pub checkout_failed: &'static str,

    // Login
    pub login_title: &'static str,
    pub login_welcome: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub login: &'static str,
    pub login_failed: &'static str,
    pub network_error: &'static str,

    // Landing page
    pub services: &'static str,
    pub top_sellers: &'static str,
    pub categories: &'static str,
    pub view_more: &'static str,
}

static EN: Messages = Messages {
    confirm: "Confirm Order",
    processing: "Processing...",
    success: "Order Placed Successfully",
    thank_you: "Thank you for your purchase!",
    order_summary: "Order Summary",
    order_id: "Order No.",
    quantity: "Qty",
    total: "Total",
    delivery: "Delivery",
    discount: "Discount",
    continue_shopping: "Continue Shopping",
    support: "Questions about your order?",
    contact_support: "Contact support",

    gift_first_name_required: "Recipient first name is required",
    gift_last_name_required: "Recipient last name is required",
    invalid_gift_phone: "Enter a valid recipient phone number",
    invalid_card_number: "Card number must be 16 digits (XXXX XXXX XXXX XXXX)",
    card_holder_required: "Card holder name is required",
    invalid_expiry_date: "Expiry date must be MM/YY",
    expired_card: "This card has expired",
    invalid_cvv: "CVV must be 3 or 4 digits",
    address_incomplete: "Please complete your shipping address first",
    checkout_failed: "Checkout failed. Please try again.",

    login_title: "Login",
    login_welcome: "Welcome back to Mashtal",
    email: "Email",
    password: "Password",
    login: "Login",
    login_failed: "Login failed. Check your email and password.",
    network_error: "Could not reach the server. Please try again.",

    services: "Our Services",
    top_sellers: "Top Sellers",
    categories: "Categories",
    view_more: "View More",
};

static AR: Messages = Messages {
    confirm: "تأكيد الطلب",
    processing: "جاري المعالجة...",
    success: "تم تقديم الطلب بنجاح",
    thank_you: "شكراً لتسوقك معنا!",
    order_summary: "ملخص الطلب",
    order_id: "رقم الطلب",
    quantity: "الكمية",
    total: "المجموع",
    delivery: "التوصيل",
    discount: "الخصم",
    continue_shopping: "متابعة التسوق",
    support: "لديك سؤال عن طلبك؟",
    contact_support: "تواصل مع الدعم",

    gift_first_name_required: "الاسم الأول للمستلم مطلوب",
    gift_last_name_required: "اسم العائلة للمستلم مطلوب",
    invalid_gift_phone: "أدخل رقم هاتف صحيح للمستلم",
    invalid_card_number: "رقم البطاقة يجب أن يكون 16 رقماً (XXXX XXXX XXXX XXXX)",
    card_holder_required: "اسم حامل البطاقة مطلوب",
    invalid_expiry_date: "تاريخ الانتهاء يجب أن يكون بصيغة MM/YY",
    expired_card: "هذه البطاقة منتهية الصلاحية",
    invalid_cvv: "رمز CVV يجب أن يكون 3 أو 4 أرقام",
    address_incomplete: "يرجى إكمال عنوان الشحن أولاً",
    checkout_failed: "فشل إتمام الطلب. حاول مرة أخرى.",

    login_title: "تسجيل الدخول",
    login_welcome: "أهلاً بعودتك إلى مشتل",
    email: "البريد الإلكتروني",
    password: "كلمة المرور",
    login: "دخول",
    login_failed: "فشل تسجيل الدخول. تحقق من بريدك وكلمة المرور.",
    network_error: "تعذر الوصول إلى الخادم. حاول مرة أخرى.",

    services: "خدماتنا",
    top_sellers: "الأكثر مبيعاً",
    categories: "الفئات",
    view_more: "عرض المزيد",
};

impl Messages {
    /// The catalog for a locale.
    #[must_use]
    pub fn for_locale(locale: Locale) -> &'static Self {
        match locale {
            Locale::En => &EN,
            Locale::Ar => &AR,
        }
    }
}
