//! Steel Siege entry point
//!
//! The browser build is driven from JavaScript through `steel_siege::web`.
//! Natively this runs a headless autopilot campaign: useful as a soak test
//! and for eyeballing balance changes.
//!
//! Usage: `steel-siege [tiger|sherman] [seed] [max_minutes]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Steel Siege (native headless) starting...");

    let mut args = std::env::args().skip(1);
    let tank = args
        .next()
        .and_then(|s| steel_siege::tuning::TankClass::parse(&s))
        .unwrap_or(steel_siege::tuning::TankClass::Tiger);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let max_minutes: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(15.0);

    if let Err(e) = headless::run(tank, seed, max_minutes) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use steel_siege::consts::FRAME_MS;
    use steel_siege::sim::TickInput;
    use steel_siege::tuning::{TankClass, Tuning};
    use steel_siege::{Campaign, GameError};

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    pub fn run(tank: TankClass, seed: u64, max_minutes: f64) -> Result<(), GameError> {
        let mut campaign = Campaign::new(tank, Tuning::default(), seed, VIEWPORT)?;
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let limit_ms = max_minutes * 60_000.0;
        let mut elapsed_ms = 0.0;

        while elapsed_ms < limit_ms {
            campaign.frame(&input, FRAME_MS);
            elapsed_ms += FRAME_MS;

            let world = &campaign.world;
            if world.game_over || world.victory {
                break;
            }
            if world.level_complete {
                shop(&mut campaign);
                campaign.start_next_level()?;
            }
        }

        let world = &campaign.world;
        let outcome = if world.victory {
            "victory"
        } else if world.game_over {
            "destroyed"
        } else {
            "time limit"
        };
        println!(
            "{outcome}: level {} after {:.1} s, {} kills, {} funds earned, hp {:.0}/{:.0}",
            world.level.id,
            elapsed_ms / 1000.0,
            campaign.ledger.kills,
            campaign.ledger.earned,
            world.player.hp,
            world.player.max_hp,
        );
        Ok(())
    }

    /// Buy the cheapest affordable upgrades until the money runs out
    fn shop(campaign: &mut Campaign) {
        loop {
            let mut offers: Vec<(u32, String)> =
                campaign.shop().map(|u| (u.cost, u.id.clone())).collect();
            offers.sort();
            let Some((_, id)) = offers
                .into_iter()
                .find(|(cost, _)| *cost <= campaign.funds())
            else {
                return;
            };
            if let Err(e) = campaign.purchase_upgrade(&id) {
                log::warn!("Purchase of {id} failed: {e}");
                return;
            }
        }
    }
}
