// Copyright 2025 therma contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Drives the provider lifecycle the way a host engine frame loop would.
//!
//! By default a scripted source plays back a warming device; pass
//! `--host` to sample the actual machine through sysinfo instead.

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::bail;
use therma_core::{NativeTelemetrySource, ProviderSettings, WarningLevel};
use therma_infra::{HostTelemetrySource, ScriptedTelemetrySource};
use therma_telemetry::{ProviderDescriptor, ProviderLoader};

const FRAME_COUNT: u32 = 180;
const FRAME_TIME: Duration = Duration::from_millis(16);

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let use_host = std::env::args().any(|arg| arg == "--host");
    let settings_path = Path::new("therma.json");
    let settings = if settings_path.exists() {
        ProviderSettings::load(settings_path)?
    } else {
        ProviderSettings {
            provider_logging: true,
            ..Default::default()
        }
    };

    let (source, warning_tx): (Box<dyn NativeTelemetrySource>, _) = if use_host {
        (Box::new(HostTelemetrySource::new()), None)
    } else {
        let scripted = ScriptedTelemetrySource::new("12.0")
            .with_temperatures([20.0, 20.5, 21.5, 23.0, 25.0, 28.0])
            .with_temperature_trend(0.4);
        let tx = scripted.warning_sender();
        (Box::new(scripted), Some(tx))
    };

    if ProviderDescriptor::register(source.as_ref()).is_none() {
        bail!("native telemetry layer is not available on this device");
    }

    let mut loader = ProviderLoader::new(settings);
    if !loader.initialize(source) {
        bail!("provider failed to initialize");
    }
    if !loader.start() {
        bail!("provider failed to start");
    }

    let Some(provider) = loader.default_provider() else {
        bail!("loader reported success but owns no provider");
    };
    log::info!("{}", provider.stats());

    for frame in 0..FRAME_COUNT {
        // Halfway through, simulate the OS pushing a thermal warning.
        if frame == FRAME_COUNT / 2 {
            if let Some(tx) = &warning_tx {
                let _ = tx.send(WarningLevel::ThrottlingImminent);
            }
        }

        let snapshot = provider.update();
        if !snapshot.is_unchanged() {
            log::info!(
                "frame {frame}: changed={} temp={:.1}C trend={:+.1}C/s warning={:?} mode={:?}",
                snapshot.change_flags,
                snapshot.temperature_level,
                snapshot.temperature_trend,
                snapshot.warning_level,
                snapshot.performance_mode,
            );
        }

        thread::sleep(FRAME_TIME);
    }

    loader.stop();
    loader.deinitialize();
    Ok(())
}
