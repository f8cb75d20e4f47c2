#![allow(dead_code)]

use std::{str::FromStr, sync::Arc};

use bigdecimal::BigDecimal;
use tablefront_orderservice::{
    app_state::AppState,
    domain::{
        ItemLine,
        menu::MenuItem,
        user::{Country, Role, User},
    },
    store::memory::MemoryStore,
};
use uuid::Uuid;

pub fn price(raw: &str) -> BigDecimal {
    BigDecimal::from_str(raw).unwrap()
}

pub fn line(item: &MenuItem, quantity: i32) -> ItemLine {
    ItemLine::new(item.id, quantity)
}

/// A small two-country world: one restaurant per country and a user for each role.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub admin_in: User,
    pub manager_in: User,
    pub member_in: User,
    pub other_member_in: User,
    pub manager_us: User,
    pub member_us: User,
    pub butter_chicken: MenuItem,
    pub paneer_tikka: MenuItem,
    pub cheeseburger: MenuItem,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());

        let user = |email: &str, role: Role, country: Country| {
            let user = User::new(Uuid::new_v4(), email, role, country);
            store.add_user(&user, None);
            user
        };
        let admin_in = user("admin@test.com", Role::Admin, Country::India);
        let manager_in = user("manager.in@test.com", Role::Manager, Country::India);
        let member_in = user("member.in@test.com", Role::Member, Country::India);
        let other_member_in = user("member2.in@test.com", Role::Member, Country::India);
        let manager_us = user("manager.us@test.com", Role::Manager, Country::America);
        let member_us = user("member.us@test.com", Role::Member, Country::America);

        let spice_route = store.add_restaurant("Spice Route", Country::India);
        let butter_chicken = store.add_menu_item(spice_route, "Butter Chicken", price("14.50"));
        let paneer_tikka = store.add_menu_item(spice_route, "Paneer Tikka", price("11.00"));

        let liberty_grill = store.add_restaurant("Liberty Grill", Country::America);
        let cheeseburger = store.add_menu_item(liberty_grill, "Cheeseburger", price("9.99"));

        let state = AppState::new(store.clone());

        Self {
            store,
            state,
            admin_in,
            manager_in,
            member_in,
            other_member_in,
            manager_us,
            member_us,
            butter_chicken,
            paneer_tikka,
            cheeseburger,
        }
    }
}
