//! User preferences shown on the settings screen.
//!
//! The record is flat: every field is independent, and [`Settings::update`] only
//! ever replaces the one field named by the [`Setting`] it is given.

use log::info;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for setting '{key}' (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}

/// Declares a closed set of string-valued options with `as_str`, `ALL`,
/// `next` and `FromStr`.
macro_rules! choice {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal : $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Human-readable label for the settings screen.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// The following option, wrapping around.
            pub fn next(self) -> Self {
                let all = Self::ALL;
                let idx = all.iter().position(|v| *v == self).unwrap_or(0);
                all[(idx + 1) % all.len()]
            }

            fn expected() -> String {
                Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(" | ")
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice!(Theme {
    Light => "light": "Light",
    Dark => "dark": "Dark",
    System => "system": "System Default",
});

choice!(Language {
    En => "en": "English",
    Es => "es": "Español",
    Fr => "fr": "Français",
    De => "de": "Deutsch",
});

choice!(FontSize {
    Small => "small": "Small",
    Medium => "medium": "Medium",
    Large => "large": "Large",
});

choice!(BubbleStyle {
    Modern => "modern": "Modern",
    Classic => "classic": "Classic",
    Minimal => "minimal": "Minimal",
});

choice!(MediaDownload {
    Never => "never": "Never",
    Wifi => "wifi": "Wi-Fi Only",
    Always => "always": "Always",
});

choice!(BackupFrequency {
    Never => "never": "Never",
    Daily => "daily": "Daily",
    Weekly => "weekly": "Weekly",
    Monthly => "monthly": "Monthly",
});

choice!(NetworkPreference {
    Wifi => "wifi": "Wi-Fi Only",
    Cellular => "cellular": "Cellular Only",
    Both => "both": "Wi-Fi & Cellular",
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    // Account & privacy
    pub name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub two_factor_enabled: bool,
    pub show_last_seen: bool,
    pub show_online_status: bool,
    pub read_receipts: bool,
    pub disappearing_messages: bool,

    // App preferences
    pub theme: Theme,
    pub language: Language,
    pub font_size: FontSize,
    pub bubble_style: BubbleStyle,
    pub message_preview: bool,

    // Notifications
    pub message_notifications: bool,
    pub vibration: bool,
    pub do_not_disturb: bool,

    // Smart features
    pub smart_replies: bool,
    pub auto_download_media: MediaDownload,
    pub ai_assistant: bool,

    // Storage & data
    pub auto_backup: BackupFrequency,
    pub network_settings: NetworkPreference,

    // Developer
    pub send_crash_reports: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            bio: "Love messaging on Whispr!".to_string(),
            two_factor_enabled: false,
            show_last_seen: true,
            show_online_status: true,
            read_receipts: true,
            disappearing_messages: false,
            theme: Theme::System,
            language: Language::En,
            font_size: FontSize::Medium,
            bubble_style: BubbleStyle::Modern,
            message_preview: true,
            message_notifications: true,
            vibration: true,
            do_not_disturb: false,
            smart_replies: true,
            auto_download_media: MediaDownload::Wifi,
            ai_assistant: false,
            auto_backup: BackupFrequency::Weekly,
            network_settings: NetworkPreference::Both,
            send_crash_reports: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Name,
    Email,
    Phone,
    Bio,
    TwoFactorEnabled,
    ShowLastSeen,
    ShowOnlineStatus,
    ReadReceipts,
    DisappearingMessages,
    Theme,
    Language,
    FontSize,
    BubbleStyle,
    MessagePreview,
    MessageNotifications,
    Vibration,
    DoNotDisturb,
    SmartReplies,
    AutoDownloadMedia,
    AiAssistant,
    AutoBackup,
    NetworkSettings,
    SendCrashReports,
}

impl SettingKey {
    pub const ALL: [SettingKey; 23] = [
        SettingKey::Name,
        SettingKey::Email,
        SettingKey::Phone,
        SettingKey::Bio,
        SettingKey::TwoFactorEnabled,
        SettingKey::ShowLastSeen,
        SettingKey::ShowOnlineStatus,
        SettingKey::ReadReceipts,
        SettingKey::DisappearingMessages,
        SettingKey::Theme,
        SettingKey::Language,
        SettingKey::FontSize,
        SettingKey::BubbleStyle,
        SettingKey::MessagePreview,
        SettingKey::MessageNotifications,
        SettingKey::Vibration,
        SettingKey::DoNotDisturb,
        SettingKey::SmartReplies,
        SettingKey::AutoDownloadMedia,
        SettingKey::AiAssistant,
        SettingKey::AutoBackup,
        SettingKey::NetworkSettings,
        SettingKey::SendCrashReports,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::Name => "name",
            SettingKey::Email => "email",
            SettingKey::Phone => "phone",
            SettingKey::Bio => "bio",
            SettingKey::TwoFactorEnabled => "twoFactorEnabled",
            SettingKey::ShowLastSeen => "showLastSeen",
            SettingKey::ShowOnlineStatus => "showOnlineStatus",
            SettingKey::ReadReceipts => "readReceipts",
            SettingKey::DisappearingMessages => "disappearingMessages",
            SettingKey::Theme => "theme",
            SettingKey::Language => "language",
            SettingKey::FontSize => "fontSize",
            SettingKey::BubbleStyle => "bubbleStyle",
            SettingKey::MessagePreview => "messagePreview",
            SettingKey::MessageNotifications => "messageNotifications",
            SettingKey::Vibration => "vibration",
            SettingKey::DoNotDisturb => "doNotDisturb",
            SettingKey::SmartReplies => "smartReplies",
            SettingKey::AutoDownloadMedia => "autoDownloadMedia",
            SettingKey::AiAssistant => "aiAssistant",
            SettingKey::AutoBackup => "autoBackup",
            SettingKey::NetworkSettings => "networkSettings",
            SettingKey::SendCrashReports => "sendCrashReports",
        }
    }

    /// Row label on the settings screen.
    pub fn label(self) -> &'static str {
        match self {
            SettingKey::Name => "Display Name",
            SettingKey::Email => "Email",
            SettingKey::Phone => "Phone",
            SettingKey::Bio => "Bio",
            SettingKey::TwoFactorEnabled => "Two-Factor Authentication",
            SettingKey::ShowLastSeen => "Show Last Seen",
            SettingKey::ShowOnlineStatus => "Show Online Status",
            SettingKey::ReadReceipts => "Read Receipts",
            SettingKey::DisappearingMessages => "Disappearing Messages",
            SettingKey::Theme => "Theme Mode",
            SettingKey::Language => "Language",
            SettingKey::FontSize => "Font Size",
            SettingKey::BubbleStyle => "Chat Bubble Style",
            SettingKey::MessagePreview => "Message Preview",
            SettingKey::MessageNotifications => "Message Notifications",
            SettingKey::Vibration => "Vibration",
            SettingKey::DoNotDisturb => "Do Not Disturb",
            SettingKey::SmartReplies => "Smart Replies",
            SettingKey::AutoDownloadMedia => "Auto-Download Media",
            SettingKey::AiAssistant => "AI Assistant Integration",
            SettingKey::AutoBackup => "Auto-Backup Settings",
            SettingKey::NetworkSettings => "Network Settings",
            SettingKey::SendCrashReports => "Send Crash Reports",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            SettingKey::Name | SettingKey::Email | SettingKey::Phone | SettingKey::Bio
        )
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One settings field together with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Text(SettingKey, String),
    Toggle(SettingKey, bool),
    Theme(Theme),
    Language(Language),
    FontSize(FontSize),
    BubbleStyle(BubbleStyle),
    AutoDownloadMedia(MediaDownload),
    AutoBackup(BackupFrequency),
    NetworkSettings(NetworkPreference),
}

impl Setting {
    pub fn key(&self) -> SettingKey {
        match self {
            Setting::Text(key, _) | Setting::Toggle(key, _) => *key,
            Setting::Theme(_) => SettingKey::Theme,
            Setting::Language(_) => SettingKey::Language,
            Setting::FontSize(_) => SettingKey::FontSize,
            Setting::BubbleStyle(_) => SettingKey::BubbleStyle,
            Setting::AutoDownloadMedia(_) => SettingKey::AutoDownloadMedia,
            Setting::AutoBackup(_) => SettingKey::AutoBackup,
            Setting::NetworkSettings(_) => SettingKey::NetworkSettings,
        }
    }

    /// Parse a `key` / `value` pair from configuration.
    pub fn parse(key: &str, value: &str) -> Result<Setting, SettingsError> {
        let key: SettingKey = key.parse()?;
        let invalid = |expected: String| SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        };

        let setting = match key {
            k if k.is_text() => Setting::Text(k, value.to_string()),
            SettingKey::Theme => Setting::Theme(value.parse().map_err(|_| invalid(Theme::expected()))?),
            SettingKey::Language => {
                Setting::Language(value.parse().map_err(|_| invalid(Language::expected()))?)
            }
            SettingKey::FontSize => {
                Setting::FontSize(value.parse().map_err(|_| invalid(FontSize::expected()))?)
            }
            SettingKey::BubbleStyle => {
                Setting::BubbleStyle(value.parse().map_err(|_| invalid(BubbleStyle::expected()))?)
            }
            SettingKey::AutoDownloadMedia => Setting::AutoDownloadMedia(
                value.parse().map_err(|_| invalid(MediaDownload::expected()))?,
            ),
            SettingKey::AutoBackup => {
                Setting::AutoBackup(value.parse().map_err(|_| invalid(BackupFrequency::expected()))?)
            }
            SettingKey::NetworkSettings => Setting::NetworkSettings(
                value.parse().map_err(|_| invalid(NetworkPreference::expected()))?,
            ),
            k => match value {
                "true" => Setting::Toggle(k, true),
                "false" => Setting::Toggle(k, false),
                _ => return Err(invalid("true | false".to_string())),
            },
        };
        Ok(setting)
    }

    /// The value a single activation on the settings screen moves to: booleans
    /// flip, options advance, text stays as is.
    pub fn cycle(self) -> Setting {
        match self {
            Setting::Text(..) => self,
            Setting::Toggle(key, on) => Setting::Toggle(key, !on),
            Setting::Theme(v) => Setting::Theme(v.next()),
            Setting::Language(v) => Setting::Language(v.next()),
            Setting::FontSize(v) => Setting::FontSize(v.next()),
            Setting::BubbleStyle(v) => Setting::BubbleStyle(v.next()),
            Setting::AutoDownloadMedia(v) => Setting::AutoDownloadMedia(v.next()),
            Setting::AutoBackup(v) => Setting::AutoBackup(v.next()),
            Setting::NetworkSettings(v) => Setting::NetworkSettings(v.next()),
        }
    }

    /// Value as shown on the settings screen.
    pub fn display_value(&self) -> String {
        match self {
            Setting::Text(_, text) => text.clone(),
            Setting::Toggle(_, on) => (if *on { "On" } else { "Off" }).to_string(),
            Setting::Theme(v) => v.label().to_string(),
            Setting::Language(v) => v.label().to_string(),
            Setting::FontSize(v) => v.label().to_string(),
            Setting::BubbleStyle(v) => v.label().to_string(),
            Setting::AutoDownloadMedia(v) => v.label().to_string(),
            Setting::AutoBackup(v) => v.label().to_string(),
            Setting::NetworkSettings(v) => v.label().to_string(),
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> Setting {
        match key {
            SettingKey::Name => Setting::Text(key, self.name.clone()),
            SettingKey::Email => Setting::Text(key, self.email.clone()),
            SettingKey::Phone => Setting::Text(key, self.phone.clone()),
            SettingKey::Bio => Setting::Text(key, self.bio.clone()),
            SettingKey::TwoFactorEnabled => Setting::Toggle(key, self.two_factor_enabled),
            SettingKey::ShowLastSeen => Setting::Toggle(key, self.show_last_seen),
            SettingKey::ShowOnlineStatus => Setting::Toggle(key, self.show_online_status),
            SettingKey::ReadReceipts => Setting::Toggle(key, self.read_receipts),
            SettingKey::DisappearingMessages => Setting::Toggle(key, self.disappearing_messages),
            SettingKey::Theme => Setting::Theme(self.theme),
            SettingKey::Language => Setting::Language(self.language),
            SettingKey::FontSize => Setting::FontSize(self.font_size),
            SettingKey::BubbleStyle => Setting::BubbleStyle(self.bubble_style),
            SettingKey::MessagePreview => Setting::Toggle(key, self.message_preview),
            SettingKey::MessageNotifications => Setting::Toggle(key, self.message_notifications),
            SettingKey::Vibration => Setting::Toggle(key, self.vibration),
            SettingKey::DoNotDisturb => Setting::Toggle(key, self.do_not_disturb),
            SettingKey::SmartReplies => Setting::Toggle(key, self.smart_replies),
            SettingKey::AutoDownloadMedia => Setting::AutoDownloadMedia(self.auto_download_media),
            SettingKey::AiAssistant => Setting::Toggle(key, self.ai_assistant),
            SettingKey::AutoBackup => Setting::AutoBackup(self.auto_backup),
            SettingKey::NetworkSettings => Setting::NetworkSettings(self.network_settings),
            SettingKey::SendCrashReports => Setting::Toggle(key, self.send_crash_reports),
        }
    }

    /// Replace exactly one field. A `Text` or `Toggle` tagged with a key of the
    /// other kind is ignored.
    pub fn update(&mut self, setting: Setting) {
        info!("Setting {} = {}", setting.key(), setting.display_value());
        match setting {
            Setting::Text(key, text) => match key {
                SettingKey::Name => self.name = text,
                SettingKey::Email => self.email = text,
                SettingKey::Phone => self.phone = text,
                SettingKey::Bio => self.bio = text,
                _ => log::warn!("Text value given for non-text setting {}", key),
            },
            Setting::Toggle(key, on) => match key {
                SettingKey::TwoFactorEnabled => self.two_factor_enabled = on,
                SettingKey::ShowLastSeen => self.show_last_seen = on,
                SettingKey::ShowOnlineStatus => self.show_online_status = on,
                SettingKey::ReadReceipts => self.read_receipts = on,
                SettingKey::DisappearingMessages => self.disappearing_messages = on,
                SettingKey::MessagePreview => self.message_preview = on,
                SettingKey::MessageNotifications => self.message_notifications = on,
                SettingKey::Vibration => self.vibration = on,
                SettingKey::DoNotDisturb => self.do_not_disturb = on,
                SettingKey::SmartReplies => self.smart_replies = on,
                SettingKey::AiAssistant => self.ai_assistant = on,
                SettingKey::SendCrashReports => self.send_crash_reports = on,
                _ => log::warn!("Boolean value given for non-toggle setting {}", key),
            },
            Setting::Theme(v) => self.theme = v,
            Setting::Language(v) => self.language = v,
            Setting::FontSize(v) => self.font_size = v,
            Setting::BubbleStyle(v) => self.bubble_style = v,
            Setting::AutoDownloadMedia(v) => self.auto_download_media = v,
            Setting::AutoBackup(v) => self.auto_backup = v,
            Setting::NetworkSettings(v) => self.network_settings = v,
        }
    }
}

/// Tabs of the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsSection {
    #[default]
    Account,
    Preferences,
    Notifications,
    Smart,
    Storage,
    Developer,
    About,
}

impl SettingsSection {
    pub const ALL: [SettingsSection; 7] = [
        SettingsSection::Account,
        SettingsSection::Preferences,
        SettingsSection::Notifications,
        SettingsSection::Smart,
        SettingsSection::Storage,
        SettingsSection::Developer,
        SettingsSection::About,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SettingsSection::Account => "Account",
            SettingsSection::Preferences => "Theme",
            SettingsSection::Notifications => "Alerts",
            SettingsSection::Smart => "Smart",
            SettingsSection::Storage => "Storage",
            SettingsSection::Developer => "Dev",
            SettingsSection::About => "About",
        }
    }

    pub fn keys(self) -> &'static [SettingKey] {
        match self {
            SettingsSection::Account => &[
                SettingKey::Name,
                SettingKey::Email,
                SettingKey::Phone,
                SettingKey::Bio,
                SettingKey::TwoFactorEnabled,
                SettingKey::ShowLastSeen,
                SettingKey::ShowOnlineStatus,
                SettingKey::ReadReceipts,
                SettingKey::DisappearingMessages,
            ],
            SettingsSection::Preferences => &[
                SettingKey::Theme,
                SettingKey::Language,
                SettingKey::FontSize,
                SettingKey::BubbleStyle,
                SettingKey::MessagePreview,
            ],
            SettingsSection::Notifications => &[
                SettingKey::MessageNotifications,
                SettingKey::Vibration,
                SettingKey::DoNotDisturb,
            ],
            SettingsSection::Smart => &[
                SettingKey::SmartReplies,
                SettingKey::AutoDownloadMedia,
                SettingKey::AiAssistant,
            ],
            SettingsSection::Storage => &[SettingKey::AutoBackup, SettingKey::NetworkSettings],
            SettingsSection::Developer => &[SettingKey::SendCrashReports],
            SettingsSection::About => &[],
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
