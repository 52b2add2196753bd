//! Weapon catalog and selection store
//!
//! The weapon is purely cosmetic: it picks the cursor image. Selection changes
//! are pushed to subscribers (the game, the settings writer, the picker UI).

/// Id of the weapon used when nothing has been picked
pub const DEFAULT_WEAPON: &str = "gun";

/// A selectable cursor image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weapon {
    pub id: String,
    /// Image path relative to the page
    pub file: String,
    pub label: String,
}

impl Weapon {
    fn new(id: &str, file: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            file: file.to_string(),
            label: label.to_string(),
        }
    }
}

/// All weapons the picker offers, in display order
#[derive(Debug, Clone)]
pub struct WeaponCatalog {
    weapons: Vec<Weapon>,
}

impl Default for WeaponCatalog {
    fn default() -> Self {
        Self {
            weapons: vec![
                Weapon::new(DEFAULT_WEAPON, "assets/GUN.png", "Gun"),
                Weapon::new("pinkgun", "assets/pinkgun.png", "Pink Gun"),
                Weapon::new("llama", "assets/llama.png", "Fortnite Llama Pickaxe"),
                Weapon::new("valGun", "assets/valGun.png", "Valorant Gun"),
                Weapon::new("pickaxe", "assets/pickaxe.png", "Minecraft Pickaxe"),
            ],
        }
    }
}

impl WeaponCatalog {
    pub fn get(&self, id: &str) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Weapon> {
        self.weapons.iter()
    }

    pub fn first(&self) -> Option<&Weapon> {
        self.weapons.first()
    }
}

/// Handle returned by [`WeaponSelection::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u32);

type Listener = Box<dyn FnMut(&Weapon)>;

/// Current weapon plus change notification
pub struct WeaponSelection {
    catalog: WeaponCatalog,
    current: Option<Weapon>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u32,
}

impl WeaponSelection {
    pub fn new(catalog: WeaponCatalog) -> Self {
        Self {
            catalog,
            current: None,
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    pub fn catalog(&self) -> &WeaponCatalog {
        &self.catalog
    }

    pub fn current(&self) -> Option<&Weapon> {
        self.current.as_ref()
    }

    /// Select by id and notify subscribers. Unknown ids leave the selection
    /// untouched and return `None`.
    pub fn select(&mut self, id: &str) -> Option<&Weapon> {
        let Some(weapon) = self.catalog.get(id).cloned() else {
            log::warn!("Ignoring unknown weapon '{}'", id);
            return None;
        };
        log::info!("Weapon selected: {}", weapon.label);
        self.current = Some(weapon.clone());
        for (_, listener) in self.listeners.iter_mut() {
            listener(&weapon);
        }
        self.current.as_ref()
    }

    /// Select the first catalog entry if nothing is selected yet
    pub fn select_default(&mut self) -> Option<&Weapon> {
        if self.current.is_none() {
            let first = self.catalog.first()?.id.clone();
            self.select(&first);
        }
        self.current.as_ref()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Weapon) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }
}
