// =============================================================================
// Build Manager
// =============================================================================
//
// Selection of a blueprint or a site, and the actions that spend cash:
// build, upgrade, sell and rotate. Pointer input on build sites is routed
// through here as well.
//
// The selection is a single enum, so a pending blueprint and a selected site
// can never be held at the same time.
//
// =============================================================================

use crate::components::{BuildEffect, Building, EntityId, SiteHighlight, SiteId};
use crate::config::{Blueprint, BuildingStats};
use crate::constants::{BUILD_EFFECT_LIFETIME, SELL_REFUND_PERCENT};
use crate::events::GameEvent;
use crate::resources::Selection;
use crate::session::GameSession;

pub fn age_effects(session: &mut GameSession, dt: f32) {
    session.world.effects.retain(|_, effect| {
        effect.lifetime -= dt;
        effect.lifetime > 0.0
    });
}

fn spawn_build_effect(session: &mut GameSession, site: SiteId) {
    let Some(position) = session.site(site).map(|s| s.build_position()) else {
        return;
    };
    let id = session.allocate_id();
    session.world.effects.insert(
        id,
        BuildEffect {
            position,
            lifetime: BUILD_EFFECT_LIFETIME,
        },
    );
}

fn create_building(
    session: &mut GameSession,
    site: SiteId,
    blueprint: &Blueprint,
    stats: &BuildingStats,
    upgraded: bool,
) -> EntityId {
    let id = session.allocate_id();
    let node = &mut session.sites[site.0];
    let building = Building {
        site,
        blueprint_id: blueprint.id.clone(),
        position: node.build_position(),
        facing: node.facing,
        fire_rate: stats.fire_rate,
        arrow_speed: stats.arrow_speed,
        arrow_damage: stats.arrow_damage,
        fire_countdown: 0.0,
        upgraded,
    };
    node.building = Some(id);
    node.blueprint_id = Some(blueprint.id.clone());
    node.upgraded = upgraded;
    session.world.buildings.insert(id, building);
    id
}

impl GameSession {
    fn ensure_running(&self) -> Result<(), String> {
        if self.controller.is_ended() {
            return Err("The round is over".to_string());
        }
        Ok(())
    }

    fn check_site(&self, site: SiteId) -> Result<(), String> {
        if site.0 >= self.sites.len() {
            return Err(format!("Unknown build site {}", site.0));
        }
        Ok(())
    }

    pub fn can_build(&self) -> bool {
        self.build.can_build()
    }

    /// Whether the pending blueprint is affordable.
    pub fn has_money(&self) -> bool {
        self.build
            .pending_blueprint()
            .and_then(|id| self.config.blueprint(id))
            .is_some_and(|blueprint| self.stats.cash >= blueprint.cost)
    }

    /// Pick a blueprint from the shop, or clear it with `None`.
    pub fn select_blueprint(&mut self, blueprint_id: Option<&str>) -> Result<(), String> {
        self.ensure_running()?;
        match blueprint_id {
            Some(id) => {
                let blueprint = self
                    .config
                    .blueprint(id)
                    .ok_or_else(|| format!("Unknown blueprint: {}", id))?;
                log::info!("{} selected", blueprint.name);
                self.build.selection = Selection::Blueprint(id.to_string());
            }
            None => self.build.selection = Selection::None,
        }
        self.build.site_ui.visible = false;
        Ok(())
    }

    /// Select an occupied site to act on. Selecting the selected site again
    /// deselects it.
    pub fn select_site(&mut self, site: SiteId) -> Result<(), String> {
        self.ensure_running()?;
        self.check_site(site)?;
        if !self.sites[site.0].is_occupied() {
            return Err(format!("Site {} has no building", site.0));
        }

        if self.build.selected_site() == Some(site) {
            self.deselect_site();
            return Ok(());
        }

        self.build.selection = Selection::Site(site);
        self.build.site_ui.target = Some(site);
        self.build.site_ui.position = self.sites[site.0].build_position();
        self.build.site_ui.visible = true;
        Ok(())
    }

    pub fn deselect_site(&mut self) {
        if let Selection::Site(_) = self.build.selection {
            self.build.selection = Selection::None;
        }
        self.build.site_ui.visible = false;
    }

    pub fn build_on(&mut self, site: SiteId) -> Result<EntityId, String> {
        self.ensure_running()?;
        self.check_site(site)?;

        let blueprint = self
            .build
            .pending_blueprint()
            .and_then(|id| self.config.blueprint(id))
            .cloned()
            .ok_or("No blueprint selected")?;

        if self.sites[site.0].is_occupied() {
            log::info!("Node occupied");
            return Err(format!("Site {} already has a building", site.0));
        }

        if self.stats.cash < blueprint.cost {
            log::info!("Too poor");
            return Err(format!(
                "Not enough cash. Need {}, have {}",
                blueprint.cost, self.stats.cash
            ));
        }

        self.stats.cash -= blueprint.cost;
        self.stats.buildings_purchased += 1;

        let building = create_building(self, site, &blueprint, &blueprint.base, false);
        spawn_build_effect(self, site);
        self.build.selection = Selection::None;

        self.emit(GameEvent::BuildingPlaced {
            site,
            building,
            blueprint: blueprint.id.clone(),
        });
        log::info!("{} built: {} left", blueprint.name, self.stats.cash);
        Ok(building)
    }

    pub fn upgrade(&mut self, site: SiteId) -> Result<EntityId, String> {
        self.ensure_running()?;
        self.check_site(site)?;

        let node = &self.sites[site.0];
        let old = node
            .building
            .ok_or_else(|| format!("Site {} has nothing to upgrade", site.0))?;
        if node.upgraded {
            return Err(format!("Site {} is already upgraded", site.0));
        }
        let blueprint = node
            .blueprint_id
            .as_deref()
            .and_then(|id| self.config.blueprint(id))
            .cloned()
            .ok_or("Building has no blueprint")?;

        if self.stats.cash < blueprint.upgrade_cost {
            log::info!("Not enough money to upgrade");
            return Err(format!(
                "Not enough cash. Need {}, have {}",
                blueprint.upgrade_cost, self.stats.cash
            ));
        }

        self.stats.cash -= blueprint.upgrade_cost;
        self.world.buildings.remove(&old);
        let building = create_building(self, site, &blueprint, &blueprint.upgraded, true);
        spawn_build_effect(self, site);

        self.emit(GameEvent::BuildingUpgraded { site, building });
        log::info!("{} upgraded: {} left", blueprint.name, self.stats.cash);
        Ok(building)
    }

    /// Remove the building and refund half of what was spent on it.
    pub fn sell(&mut self, site: SiteId) -> Result<i32, String> {
        self.ensure_running()?;
        self.check_site(site)?;

        let node = &mut self.sites[site.0];
        let building = node
            .building
            .take()
            .ok_or_else(|| format!("Site {} has nothing to sell", site.0))?;
        let upgraded = std::mem::take(&mut node.upgraded);
        let blueprint_id = node.blueprint_id.take();

        let spent = blueprint_id
            .as_deref()
            .and_then(|id| self.config.blueprint(id))
            .map(|b| b.cost + if upgraded { b.upgrade_cost } else { 0 })
            .unwrap_or(0);
        let refund = (spent as f32 * SELL_REFUND_PERCENT) as i32;

        self.world.buildings.remove(&building);
        self.stats.cash += refund;
        if self.build.selected_site() == Some(site) {
            self.deselect_site();
        }

        self.emit(GameEvent::BuildingSold { site, refund });
        log::info!("Building sold for {}", refund);
        Ok(refund)
    }

    /// Turn the site a quarter turn; its building fires along the new facing.
    pub fn rotate(&mut self, site: SiteId) -> Result<(), String> {
        self.ensure_running()?;
        self.check_site(site)?;

        let node = &mut self.sites[site.0];
        node.facing = node.facing.rotated();
        let facing = node.facing;
        if let Some(building) = node.building.and_then(|id| self.world.buildings.get_mut(&id)) {
            building.facing = facing;
        }

        self.emit(GameEvent::SiteRotated { site });
        log::info!("Node rotated");
        Ok(())
    }

    /// Upgrade the site shown in the action panel, then close the panel.
    pub fn upgrade_selected(&mut self) -> Result<EntityId, String> {
        let site = self.build.selected_site().ok_or("No site selected")?;
        let result = self.upgrade(site);
        self.deselect_site();
        result
    }

    pub fn sell_selected(&mut self) -> Result<i32, String> {
        let site = self.build.selected_site().ok_or("No site selected")?;
        self.sell(site)
    }

    pub fn rotate_selected(&mut self) -> Result<(), String> {
        let site = self.build.selected_site().ok_or("No site selected")?;
        self.rotate(site)
    }

    /// Click on a site: act on an occupied site, or place the pending blueprint.
    pub fn pointer_down(&mut self, site: SiteId) -> Result<(), String> {
        self.ensure_running()?;
        self.check_site(site)?;

        if self.sites[site.0].is_occupied() {
            return self.select_site(site);
        }
        if !self.can_build() {
            return Ok(());
        }

        let result = self.build_on(site).map(|_| ());
        // The blueprint is used up by the click whether or not it could be paid for
        self.build.selection = Selection::None;
        self.sites[site.0].highlight = SiteHighlight::None;
        result
    }

    pub fn pointer_enter(&mut self, site: SiteId) {
        if site.0 >= self.sites.len() || !self.can_build() {
            return;
        }
        self.sites[site.0].highlight = if self.has_money() {
            SiteHighlight::Affordable
        } else {
            SiteHighlight::TooPoor
        };
    }

    pub fn pointer_exit(&mut self, site: SiteId) {
        if let Some(node) = self.sites.get_mut(site.0) {
            node.highlight = SiteHighlight::None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn session() -> GameSession {
        GameSession::new(GameConfig::default()).unwrap()
    }

    fn build(session: &mut GameSession, blueprint: &str, site: usize) -> EntityId {
        session.select_blueprint(Some(blueprint)).unwrap();
        session.build_on(SiteId(site)).unwrap()
    }

    fn assert_exclusive(session: &GameSession) {
        let manager = session.build_manager();
        assert!(!(manager.pending_blueprint().is_some() && manager.selected_site().is_some()));
    }

    #[test]
    fn building_spends_cash_and_occupies_the_site() {
        let mut session = session();
        let cash = session.stats().cash;
        session.select_blueprint(Some("archer")).unwrap();

        let building = session.build_on(SiteId(0)).unwrap();

        assert_eq!(session.stats().cash, cash - 100);
        assert_eq!(session.stats().buildings_purchased, 1);
        assert_eq!(session.site(SiteId(0)).unwrap().building, Some(building));
        assert_eq!(session.build_manager().selection, Selection::None);
        assert_eq!(session.world().effects.len(), 1);
    }

    #[test]
    fn too_poor_leaves_everything_unchanged() {
        let mut session = session();
        session.stats.cash = 99;
        session.select_blueprint(Some("archer")).unwrap();

        assert!(session.build_on(SiteId(0)).is_err());

        assert_eq!(session.stats().cash, 99);
        assert_eq!(session.stats().buildings_purchased, 0);
        assert_eq!(session.site(SiteId(0)).unwrap().building, None);
        assert!(session.world().buildings.is_empty());
    }

    #[test]
    fn selections_stay_mutually_exclusive() {
        let mut session = session();
        for site in 1..=3 {
            build(&mut session, "archer", site);
        }
        session.select_blueprint(Some("archer")).unwrap();
        assert_exclusive(&session);
        session.select_site(SiteId(1)).unwrap();
        assert_exclusive(&session);
        assert_eq!(session.build_manager().selected_site(), Some(SiteId(1)));
        session.select_blueprint(Some("crossbow")).unwrap();
        assert_exclusive(&session);
        assert_eq!(session.build_manager().selected_site(), None);
        session.select_site(SiteId(2)).unwrap();
        session.select_site(SiteId(3)).unwrap();
        assert_exclusive(&session);
        session.select_blueprint(None).unwrap();
        assert_eq!(session.build_manager().selection, Selection::None);
    }

    #[test]
    fn reselecting_a_site_deselects_it() {
        let mut session = session();
        build(&mut session, "archer", 4);
        session.select_site(SiteId(4)).unwrap();
        assert!(session.build_manager().site_ui.visible);
        session.select_site(SiteId(4)).unwrap();
        assert_eq!(session.build_manager().selected_site(), None);
        assert!(!session.build_manager().site_ui.visible);
    }

    #[test]
    fn empty_sites_cannot_be_selected() {
        let mut session = session();
        assert!(session.select_site(SiteId(5)).is_err());
        assert_eq!(session.build_manager().selected_site(), None);
        assert!(!session.build_manager().site_ui.visible);

        // Clicking an empty site with nothing pending opens no panel either
        session.pointer_down(SiteId(5)).unwrap();
        assert!(!session.build_manager().site_ui.visible);
    }

    #[test]
    fn unknown_blueprint_is_rejected() {
        let mut session = session();
        assert!(session.select_blueprint(Some("trebuchet")).is_err());
        assert!(!session.can_build());
    }

    #[test]
    fn clicking_an_occupied_site_selects_it() {
        let mut session = session();
        session.select_blueprint(Some("archer")).unwrap();
        session.pointer_down(SiteId(0)).unwrap();
        assert!(session.site(SiteId(0)).unwrap().is_occupied());

        session.select_blueprint(Some("archer")).unwrap();
        session.pointer_down(SiteId(0)).unwrap();
        assert_eq!(session.build_manager().selected_site(), Some(SiteId(0)));
        assert_eq!(session.stats().buildings_purchased, 1);
    }

    #[test]
    fn failed_click_still_clears_the_blueprint() {
        let mut session = session();
        session.stats.cash = 0;
        session.select_blueprint(Some("archer")).unwrap();
        assert!(session.pointer_down(SiteId(0)).is_err());
        assert!(!session.can_build());
        assert!(!session.site(SiteId(0)).unwrap().is_occupied());
    }

    #[test]
    fn hover_reflects_affordability() {
        let mut session = session();
        session.pointer_enter(SiteId(0));
        assert_eq!(session.site(SiteId(0)).unwrap().highlight, SiteHighlight::None);

        session.select_blueprint(Some("crossbow")).unwrap();
        session.pointer_enter(SiteId(0));
        assert_eq!(session.site(SiteId(0)).unwrap().highlight, SiteHighlight::Affordable);

        session.stats.cash = 10;
        session.pointer_enter(SiteId(1));
        assert_eq!(session.site(SiteId(1)).unwrap().highlight, SiteHighlight::TooPoor);

        session.pointer_exit(SiteId(1));
        assert_eq!(session.site(SiteId(1)).unwrap().highlight, SiteHighlight::None);
    }

    #[test]
    fn upgrade_replaces_the_building_once() {
        let mut session = session();
        session.select_blueprint(Some("archer")).unwrap();
        let original = session.build_on(SiteId(0)).unwrap();
        let cash = session.stats().cash;

        session.select_site(SiteId(0)).unwrap();
        let upgraded = session.upgrade_selected().unwrap();

        assert_ne!(original, upgraded);
        assert!(!session.world().buildings.contains_key(&original));
        assert!(session.world().buildings[&upgraded].upgraded);
        assert_eq!(session.world().buildings[&upgraded].fire_rate, 1.5);
        assert_eq!(session.stats().cash, cash - 60);
        assert_eq!(session.build_manager().selected_site(), None);

        assert!(session.upgrade(SiteId(0)).is_err());
        assert_eq!(session.stats().cash, cash - 60);
    }

    #[test]
    fn upgrade_without_cash_is_refused() {
        let mut session = session();
        session.select_blueprint(Some("archer")).unwrap();
        let original = session.build_on(SiteId(0)).unwrap();
        session.stats.cash = 10;

        assert!(session.upgrade(SiteId(0)).is_err());
        assert_eq!(session.site(SiteId(0)).unwrap().building, Some(original));
        assert_eq!(session.stats().cash, 10);
    }

    #[test]
    fn selling_refunds_half_and_frees_the_site() {
        let mut session = session();
        session.select_blueprint(Some("crossbow")).unwrap();
        session.build_on(SiteId(2)).unwrap();
        session.upgrade(SiteId(2)).unwrap();
        let cash = session.stats().cash;

        session.select_site(SiteId(2)).unwrap();
        assert_eq!(session.sell_selected(), Ok(120));

        assert_eq!(session.stats().cash, cash + 120);
        let site = session.site(SiteId(2)).unwrap();
        assert!(!site.is_occupied());
        assert!(!site.upgraded);
        assert!(session.world().buildings.is_empty());
        assert!(session.sell(SiteId(2)).is_err());
    }

    #[test]
    fn rotating_turns_the_building_too() {
        let mut session = session();
        session.select_blueprint(Some("archer")).unwrap();
        let building = session.build_on(SiteId(0)).unwrap();
        let before = session.site(SiteId(0)).unwrap().facing;

        session.rotate(SiteId(0)).unwrap();

        assert_eq!(session.site(SiteId(0)).unwrap().facing, before.rotated());
        assert_eq!(session.world().buildings[&building].facing, before.rotated());
    }

    #[test]
    fn build_effects_fade_out() {
        let mut session = session();
        session.select_blueprint(Some("archer")).unwrap();
        session.build_on(SiteId(0)).unwrap();
        age_effects(&mut session, BUILD_EFFECT_LIFETIME - 1.0);
        assert_eq!(session.world().effects.len(), 1);
        age_effects(&mut session, 1.0);
        assert!(session.world().effects.is_empty());
    }
}
