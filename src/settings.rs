//! Player settings
//!
//! Two values survive a reload: the chosen weapon and whether the secret
//! levels have been unlocked. Each lives under its own LocalStorage key.

/// Persisted player choices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Selected weapon id (`None` = catalog default)
    pub weapon: Option<String>,
    /// Secret levels visible in the level list
    pub secret_unlocked: bool,
}

impl Settings {
    /// LocalStorage key for the weapon id (used only in wasm32)
    #[allow(dead_code)]
    const WEAPON_KEY: &'static str = "john_chase_weapon";
    /// LocalStorage key for the unlock flag (used only in wasm32)
    #[allow(dead_code)]
    const SECRET_KEY: &'static str = "john_chase_secret_unlocked";

    /// Mark the secret levels unlocked. Returns true if this changed anything.
    pub fn unlock_secret(&mut self) -> bool {
        let changed = !self.secret_unlocked;
        self.secret_unlocked = true;
        changed
    }

    /// Remember a weapon choice. Returns true if this changed anything.
    pub fn set_weapon(&mut self, id: &str) -> bool {
        if self.weapon.as_deref() == Some(id) {
            return false;
        }
        self.weapon = Some(id.to_string());
        true
    }

    /// Parse the stored unlock flag, treating anything unreadable as locked
    /// (used only in wasm32)
    #[allow(dead_code)]
    fn parse_flag(raw: Option<&str>) -> bool {
        raw.and_then(|s| serde_json::from_str::<bool>(s).ok())
            .unwrap_or(false)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::info!("No LocalStorage, using default settings");
            return Self::default();
        };

        let weapon = storage
            .get_item(Self::WEAPON_KEY)
            .ok()
            .flatten()
            .filter(|s| !s.is_empty());
        let flag = storage.get_item(Self::SECRET_KEY).ok().flatten();
        let settings = Self {
            weapon,
            secret_unlocked: Self::parse_flag(flag.as_deref()),
        };
        log::info!("Loaded settings: {:?}", settings);
        settings
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Some(weapon) = &self.weapon {
                let _ = storage.set_item(Self::WEAPON_KEY, weapon);
            }
            if let Ok(flag) = serde_json::to_string(&self.secret_unlocked) {
                let _ = storage.set_item(Self::SECRET_KEY, &flag);
            }
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
