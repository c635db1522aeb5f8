// Arbor - A headless content backend built with Rust
// Copyright (C) 2025 Arbor Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

pub mod admin;
pub mod auth;
pub mod lists;
pub mod products;
pub mod users;

pub use admin::admin_meta;
pub use auth::{current_session, init, init_status, login, logout};
pub use lists::list_registry;
pub use products::{
    add_product_image, create_product, delete_product, get_product, list_products,
};
pub use users::{create_user, list_users, update_user_role};
