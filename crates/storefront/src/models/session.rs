//! Session-stored types and the named client-store keys.

use serde::{Deserialize, Serialize};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend customer id.
    pub user_id: String,
    /// Backend access token for this customer.
    pub token: String,
}

/// Named keys in the client store.
///
/// `userId`, `appliedCoupon`, and `lastOrder` are the checkout handoff
/// keys; `checkoutProcessing` is the submission re-entrancy guard.
pub mod keys {
    use crate::checkout::receipt::OrderReceipt;
    use crate::commerce::AppliedCoupon;
    use crate::storage::TypedKey;

    use super::CurrentUser;

    /// The logged-in customer id. Required before checkout can submit.
    pub const USER_ID: TypedKey<String> = TypedKey::new("userId");

    /// Coupon applied earlier in the cart flow; removed on successful
    /// checkout.
    pub const APPLIED_COUPON: TypedKey<AppliedCoupon> = TypedKey::new("appliedCoupon");

    /// Receipt of the last placed order, consumed by the success page.
    pub const LAST_ORDER: TypedKey<OrderReceipt> = TypedKey::new("lastOrder");

    /// Re-entrancy guard while a submission is in flight.
    pub const CHECKOUT_PROCESSING: TypedKey<bool> = TypedKey::new("checkoutProcessing");

    /// Full login identity (id + token).
    pub const CURRENT_USER: TypedKey<CurrentUser> = TypedKey::new("currentUser");
}
