/// Hardware constants for supported boards.
///
/// Pin assignments and capabilities, selected at compile time via feature
/// flags. `board-explorer` builds on top of `board-tinypico`.

#[cfg(all(feature = "board-tinypico", not(feature = "board-explorer")))]
mod hw {
    pub const DOTSTAR_DATA_PIN: u8 = 2;
    pub const DOTSTAR_CLK_PIN: u8 = 12;
    pub const DOTSTAR_PWR_PIN: u8 = 13; // Active low
    pub const BAT_CHARGE_PIN: u8 = 34;
    pub const BAT_VOLTAGE_PIN: u8 = 35;
    pub const I2C_SDA_PIN: u8 = 21;
    pub const I2C_SCL_PIN: u8 = 22;
    pub const HAS_TOUCH_PADS: bool = false;
    pub const HAS_BUZZER: bool = false;
    pub const BOARD_NAME: &str = "tinypico";
}

#[cfg(feature = "board-explorer")]
mod hw {
    pub const DOTSTAR_DATA_PIN: u8 = 2;
    pub const DOTSTAR_CLK_PIN: u8 = 12;
    pub const DOTSTAR_PWR_PIN: u8 = 13; // Active low
    pub const BAT_CHARGE_PIN: u8 = 34;
    pub const BAT_VOLTAGE_PIN: u8 = 35;
    pub const I2C_SDA_PIN: u8 = 21;
    pub const I2C_SCL_PIN: u8 = 22;
    pub const HAS_TOUCH_PADS: bool = true;
    pub const HAS_BUZZER: bool = true;
    pub const BUZZER_PIN: u8 = 25;
    pub const BUZZER_FREQ_HZ: u32 = 2000;
    pub const BUZZER_BEEP_MS: u64 = 20;
    pub const BOARD_NAME: &str = "tinypico_explorer";
}

#[cfg(not(any(feature = "board-tinypico", feature = "board-explorer")))]
mod hw {
    pub const HAS_TOUCH_PADS: bool = false;
    pub const HAS_BUZZER: bool = false;
    pub const BOARD_NAME: &str = "unknown";
}

pub use hw::*;
