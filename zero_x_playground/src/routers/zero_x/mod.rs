pub mod quote;
pub mod requests;
pub mod responses;
pub mod zero_x;

// https://0x.org/docs/0x-swap-api/introduction
pub const DEFAULT_ZERO_X_API_URL: &str = "https://kovan.api.0x.org";

const SWAP_PATH: &str = "swap";
const SWAP_API_VERSION: u32 = 0;
const QUOTE_ENDPOINT: &str = "quote";
