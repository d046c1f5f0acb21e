/// Default increment endpoint (buy one unit).
pub const DEFAULT_BUY_ENDPOINT: &str = "/buy_1";

/// Default decrement endpoint (sell one unit).
pub const DEFAULT_SELL_ENDPOINT: &str = "/sell_1";

/// Stock names offered by the typeahead when none are configured.
pub const DEFAULT_STOCK_NAMES: [&str; 13] = [
    "3D Systems Corporation",
    "3M Company",
    "500.com Limited",
    "58.com Inc.",
    "8x8 Inc",
    "A.H. Belo Corporation",
    "A.O Smith Corporation",
    "A10 Networks, Inc.",
    "AAR Corp.",
    "ABB Ltd",
    "Abbott Laboratories",
    "AbbVie Inc.",
    "Abercrombie & Fitch Company",
];
