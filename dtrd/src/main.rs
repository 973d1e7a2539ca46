// Copyright (C) 2023 Felix Huettner
//
// This file is part of DTRD.
//
// DTRD is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// DTRD is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use actix::{Actor, System};
use log::info;

use dtrd::{
    bundleprotocolagent, bundlestorageagent, clientagent, common::settings::Settings,
    custodyagent, nodeagent, redundancyagent,
};

#[actix_rt::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting up");
    let settings: Settings = Settings::from_env();
    info!("Starting with settings: {settings:?}");

    // Starting each component brings its `SystemService` registry entry to
    // life and runs its `started()` hook (index load, periodic timers).
    bundlestorageagent::agent::Daemon::default().start();
    redundancyagent::agent::Daemon::default().start();
    custodyagent::agent::Daemon::default().start();
    bundleprotocolagent::agent::Daemon::default().start();
    clientagent::agent::Daemon::default().start();
    nodeagent::agent::Daemon::default().start();

    info!("Node {} ready", settings.my_node_id);

    tokio::signal::ctrl_c().await.expect("failed to listen for ctrl-c");
    info!("Shutting down");

    System::current().stop();
}
