//! System-wide constants for the GrantHub escrow ledger.

use rust_decimal::Decimal;

/// Domain separator for open-secret commitments.
pub const OPEN_SECRET_DOMAIN: &[u8] = b"granthub:commitment:open:v1:";

/// Domain separator for address-bound commitments.
pub const ADDRESS_BOUND_DOMAIN: &[u8] = b"granthub:commitment:bound:v1:";

/// Domain separator for two-part commitments.
pub const TWO_PART_DOMAIN: &[u8] = b"granthub:commitment:pair:v1:";

/// Default operator cut when fees are enabled: 0.01 units.
pub const DEFAULT_CUT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "GrantHub";
