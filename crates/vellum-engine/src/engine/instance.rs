use std::any::Any;

use anyhow::Context as _;

use crate::base::Base;
use crate::config::EngineConfig;
use crate::coords::{CoordinateSpace, Rect, Rgb};
use crate::driver::{Driver, DriverRegistry, ImageBlit, Payload};
use crate::error::{EngineError, InitStage, Result};
use crate::input::{DispatchCtx, Event, EventDispatch, EventMask, InputBase, SubscriptionId};
use crate::logging::init_logging;
use crate::resource::ResourceCache;

use super::Backends;

/// Engine lifecycle.
///
/// `select_driver` moves to `DriverSelected`, `start` on to `Running`, and
/// `shutdown` or a failed `start` back to `Uninitialized`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Lifecycle {
    Uninitialized,
    DriverSelected,
    Running,
}

/// The presentation core.
pub struct Engine {
    config: EngineConfig,
    state: Lifecycle,

    registry: DriverRegistry,
    base: Box<dyn Base>,
    input: Box<dyn InputBase>,
    driver: Option<Box<dyn Driver>>,
    driver_name: Option<&'static str>,

    space: CoordinateSpace,
    cache: ResourceCache,
    dispatch: EventDispatch,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("driver", &self.driver_name)
            .field("base", &self.base.id())
            .field("space", &self.space)
            .field("resources", &self.cache.len())
            .field("subscriptions", &self.dispatch.len())
            .finish()
    }
}

fn active_driver<'a>(
    slot: &'a mut Option<Box<dyn Driver>>,
    operation: &'static str,
) -> Result<&'a mut (dyn Driver + 'static)> {
    slot.as_deref_mut()
        .ok_or(EngineError::NotInitialized { operation })
}

impl Engine {
    pub fn new(config: EngineConfig, backends: Backends) -> Self {
        let space = CoordinateSpace::from_config(&config);
        Self {
            config,
            state: Lifecycle::Uninitialized,
            registry: backends.registry,
            base: backends.base,
            input: backends.input,
            driver: None,
            driver_name: None,
            space,
            cache: ResourceCache::new(),
            dispatch: EventDispatch::new(),
        }
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Mutable configuration. Only available while uninitialised.
    pub fn config_mut(&mut self) -> Result<&mut EngineConfig> {
        if self.state != Lifecycle::Uninitialized {
            return Err(EngineError::ConfigLocked);
        }
        Ok(&mut self.config)
    }

    /// Sets the physical target size used by the next `start`.
    pub fn set_resolution(&mut self, width: u32, height: u32) -> Result<()> {
        let config = self.config_mut()?;
        config.physical_width = width;
        config.physical_height = height;
        Ok(())
    }

    #[inline]
    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    /// Name of the selected driver, if one is up.
    #[inline]
    pub fn driver_name(&self) -> Option<&'static str> {
        self.driver_name
    }

    /// Concrete access to the active driver.
    pub fn driver_as<T: Any>(&self) -> Option<&T> {
        self.driver.as_deref()?.as_any().downcast_ref()
    }

    pub fn driver_as_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.driver.as_deref_mut()?.as_any_mut().downcast_mut()
    }

    /// Brings up the base and selects a driver without starting it.
    ///
    /// Resources and subscriptions can be registered from here on; drawing
    /// and input polling wait for [`start`](Self::start). Does nothing unless
    /// the engine is uninitialised.
    pub fn select_driver(&mut self) -> Result<()> {
        if self.state != Lifecycle::Uninitialized {
            log::warn!("engine: select_driver while {:?}, ignoring", self.state);
            return Ok(());
        }

        init_logging(&self.config.logging);

        self.base.init(&self.config).map_err(|source| {
            log::error!("engine: base init failed: {source:#}");
            EngineError::InitFailure { stage: InitStage::Base, source }
        })?;

        let (name, driver) = match self.registry.select(self.config.preferred_driver.as_deref()) {
            Ok(selected) => selected,
            Err(e) => {
                log::error!("engine: {e}");
                self.base.cleanup();
                return Err(e);
            }
        };

        self.driver = Some(driver);
        self.driver_name = Some(name);
        self.space = CoordinateSpace::from_config(&self.config);
        self.state = Lifecycle::DriverSelected;
        Ok(())
    }

    /// Selects a driver if needed, then starts it and the input base.
    ///
    /// On failure everything brought up so far, including resources and
    /// subscriptions registered after selection, is torn down again and the
    /// engine is left uninitialised. Calling `start` on a running engine does
    /// nothing.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            Lifecycle::Running => {
                log::warn!("engine: start while running, ignoring");
                return Ok(());
            }
            Lifecycle::Uninitialized => self.select_driver()?,
            Lifecycle::DriverSelected => {}
        }

        let name = self.driver_name.unwrap_or("?");
        let driver = active_driver(&mut self.driver, "start")?;
        if let Err(source) = driver
            .init(&self.config)
            .with_context(|| format!("driver {name:?}"))
        {
            log::error!("engine: driver init failed: {source:#}");
            self.unwind_selection();
            return Err(EngineError::InitFailure { stage: InitStage::Driver, source });
        }

        if let Err(source) = self.input.init(&self.config) {
            log::error!("engine: input init failed: {source:#}");
            if let Some(driver) = self.driver.as_deref_mut() {
                driver.cleanup();
            }
            self.unwind_selection();
            return Err(EngineError::InitFailure { stage: InitStage::Input, source });
        }

        log::info!(
            "engine: running on {name:?} ({:?} base), {}x{} logical -> {}x{}",
            self.base.id(),
            self.config.logical_width,
            self.config.logical_height,
            self.config.physical_width,
            self.config.physical_height,
        );

        self.state = Lifecycle::Running;
        Ok(())
    }

    /// Frees every cached resource, drops all subscriptions and tears the
    /// backends down in reverse start order. Idempotent.
    pub fn shutdown(&mut self) {
        match self.state {
            Lifecycle::Uninitialized => return,
            Lifecycle::DriverSelected => self.unwind_selection(),
            Lifecycle::Running => {
                if let Some(mut driver) = self.driver.take() {
                    let freed = self.cache.clear_all(driver.as_mut());
                    log::debug!("engine: freed {freed} resource(s)");
                    self.dispatch.clear();
                    self.input.cleanup();
                    driver.cleanup();
                }
                self.base.cleanup();
                self.driver_name = None;
                self.state = Lifecycle::Uninitialized;
            }
        }
        log::info!("engine: shut down");
    }

    /// Drops a selected but not started driver along with everything
    /// registered against it, then the base.
    fn unwind_selection(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            let freed = self.cache.clear_all(driver.as_mut());
            log::debug!("engine: freed {freed} resource(s)");
        }
        self.dispatch.clear();
        self.base.cleanup();
        self.driver_name = None;
        self.state = Lifecycle::Uninitialized;
    }

    fn require(&self, min: Lifecycle, operation: &'static str) -> Result<()> {
        if self.state >= min {
            Ok(())
        } else {
            Err(EngineError::NotInitialized { operation })
        }
    }

    // ── resources ─────────────────────────────────────────────────────────

    /// Loads `key` into the cache unless it is already there.
    pub fn load_resource(&mut self, key: &str) -> Result<()> {
        self.require(Lifecycle::DriverSelected, "load_resource")?;
        let driver = active_driver(&mut self.driver, "load_resource")?;
        self.cache.load(key, driver).map(|_| ())
    }

    /// Stores a payload produced by the active driver under `key`,
    /// replacing any previous entry.
    pub fn add_resource(&mut self, key: &str, payload: Payload) -> Result<()> {
        self.require(Lifecycle::DriverSelected, "add_resource")?;
        let driver = active_driver(&mut self.driver, "add_resource")?;
        self.cache.add_or_replace(key, payload, driver)
    }

    pub fn delete_resource(&mut self, key: &str) -> Result<()> {
        self.require(Lifecycle::DriverSelected, "delete_resource")?;
        let driver = active_driver(&mut self.driver, "delete_resource")?;
        self.cache.delete(key, driver)
    }

    /// Frees every cached resource. Returns how many were freed.
    pub fn clear_resources(&mut self) -> Result<usize> {
        self.require(Lifecycle::DriverSelected, "clear_resources")?;
        let driver = active_driver(&mut self.driver, "clear_resources")?;
        Ok(self.cache.clear_all(driver))
    }

    /// Cached payload for `key`. Never loads.
    pub fn resource(&self, key: &str) -> Result<&dyn Any> {
        self.require(Lifecycle::DriverSelected, "resource")?;
        self.cache
            .get(key)
            .ok_or_else(|| EngineError::not_found(format!("resource {key:?}")))
    }

    #[inline]
    pub fn resource_count(&self) -> usize {
        self.cache.len()
    }

    // ── input ─────────────────────────────────────────────────────────────

    pub fn install_callback<F>(&mut self, mask: EventMask, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(&Event, &mut DispatchCtx) + 'static,
    {
        self.require(Lifecycle::DriverSelected, "install_callback")?;
        self.dispatch.install_callback(mask, callback)
    }

    pub fn unload_callback(&mut self, id: SubscriptionId) -> Result<()> {
        self.require(Lifecycle::DriverSelected, "unload_callback")?;
        self.dispatch.unload_callback(id)
    }

    /// Delivers an already-normalized event. Returns the number of callbacks invoked.
    pub fn dispatch(&mut self, event: &Event) -> Result<usize> {
        self.require(Lifecycle::DriverSelected, "dispatch")?;
        Ok(self.dispatch.dispatch(event))
    }

    /// Polls the input base and dispatches what it produced.
    /// Returns the number of events dispatched.
    pub fn process_input(&mut self) -> Result<usize> {
        self.require(Lifecycle::Running, "process_input")?;
        Ok(self.input.poll_and_dispatch(&self.space, &mut self.dispatch))
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Blits a `w`x`h` region of resource `key`, starting at `(src_x, src_y)`
    /// in the image, to `(dst_x, dst_y)` on the logical screen. The resource
    /// is loaded on first use.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image(
        &mut self,
        key: &str,
        src_x: i32,
        src_y: i32,
        dst_x: i32,
        dst_y: i32,
        w: i32,
        h: i32,
    ) -> Result<()> {
        self.require(Lifecycle::Running, "draw_image")?;

        let (src_x, src_y) = self.space.translate(src_x, src_y, false);
        let (dst_x, dst_y) = self.space.translate(dst_x, dst_y, true);
        let (w, h) = self.space.translate(w, h, false);
        let blit = ImageBlit { src_x, src_y, dst_x, dst_y, w, h };

        let driver = active_driver(&mut self.driver, "draw_image")?;
        let resource = self.cache.load(key, driver)?;
        driver.draw_image(resource, blit).map_err(|source| {
            log::warn!("engine: drawing {key:?} failed: {source:#}");
            EngineError::DrawFailed { key: key.to_string(), source }
        })
    }

    /// Fills a logical rectangle.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) -> Result<()> {
        self.require(Lifecycle::Running, "fill_rect")?;
        let rect = self.space.translate_rect(Rect::new(x, y, w, h));
        active_driver(&mut self.driver, "fill_rect")?.fill_rect(rect, color);
        Ok(())
    }

    /// Presents the frame drawn since the last call.
    pub fn present(&mut self) -> Result<()> {
        self.require(Lifecycle::Running, "present")?;
        active_driver(&mut self.driver, "present")?.update();
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use anyhow::bail;

    use super::*;
    use crate::base::BaseId;
    use crate::driver::software::{Image, SoftwareDriver};
    use crate::driver::testing::{MockDriver, payload_id};
    use crate::driver::DriverDescriptor;
    use crate::input::{Edge, RawInput, ScriptedInput};

    static MOCK_ONLY: &[DriverDescriptor] = &[DriverDescriptor::new("mock", MockDriver::register)];
    static FAILING_ONLY: &[DriverDescriptor] =
        &[DriverDescriptor::new("failing", MockDriver::register_failing)];
    static EMPTY: &[DriverDescriptor] = &[];

    #[derive(Default, Clone)]
    struct Counters {
        inits: Rc<Cell<u32>>,
        cleanups: Rc<Cell<u32>>,
    }

    struct RecordingBase(Counters);

    impl Base for RecordingBase {
        fn init(&mut self, _config: &EngineConfig) -> anyhow::Result<()> {
            self.0.inits.set(self.0.inits.get() + 1);
            Ok(())
        }

        fn cleanup(&mut self) {
            self.0.cleanups.set(self.0.cleanups.get() + 1);
        }

        fn id(&self) -> BaseId {
            BaseId::Headless
        }
    }

    struct BrokenInput;

    impl InputBase for BrokenInput {
        fn init(&mut self, _config: &EngineConfig) -> anyhow::Result<()> {
            bail!("no input devices")
        }

        fn cleanup(&mut self) {}

        fn poll_and_dispatch(&mut self, _: &CoordinateSpace, _: &mut EventDispatch) -> usize {
            0
        }
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
            .with_physical_size(640, 400)
            .with_preferred_driver("mock")
    }

    fn mock_engine() -> (Engine, Counters) {
        let counters = Counters::default();
        let backends = Backends::default()
            .with_registry(DriverRegistry::new(MOCK_ONLY))
            .with_base(RecordingBase(counters.clone()));
        (Engine::new(config(), backends), counters)
    }

    fn started() -> Engine {
        let (mut engine, _) = mock_engine();
        engine.start().unwrap();
        engine
    }

    fn mock(engine: &Engine) -> &MockDriver {
        engine.driver_as::<MockDriver>().unwrap()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn operations_before_start_are_rejected() {
        let (mut engine, _) = mock_engine();
        assert!(matches!(
            engine.load_resource("a"),
            Err(EngineError::NotInitialized { operation: "load_resource" })
        ));
        assert!(matches!(
            engine.draw_image("a", 0, 0, 0, 0, 1, 1),
            Err(EngineError::NotInitialized { .. })
        ));
        assert!(engine.install_callback(EventMask::QUIT, |_, _| {}).is_err());
        assert!(engine.present().is_err());
        assert!(engine.process_input().is_err());
        assert!(engine.resource("a").is_err());
    }

    #[test]
    fn start_reaches_running_with_selected_driver() {
        let (mut engine, counters) = mock_engine();
        engine.start().unwrap();

        assert_eq!(engine.state(), Lifecycle::Running);
        assert_eq!(engine.driver_name(), Some("mock"));
        assert_eq!(counters.inits.get(), 1);
        assert!(mock(&engine).initialized);
        assert_eq!(engine.space().scale(), (2, 2));
    }

    #[test]
    fn config_is_locked_while_started() {
        let (mut engine, _) = mock_engine();
        engine.set_resolution(960, 600).unwrap();
        engine.start().unwrap();

        assert!(matches!(engine.config_mut(), Err(EngineError::ConfigLocked)));
        assert!(engine.set_resolution(320, 200).is_err());
        assert_eq!(engine.space().physical_size(), (960, 600));

        engine.shutdown();
        assert!(engine.config_mut().is_ok());
    }

    #[test]
    fn selected_driver_accepts_resources_but_not_drawing() {
        let (mut engine, counters) = mock_engine();
        engine.select_driver().unwrap();

        assert_eq!(engine.state(), Lifecycle::DriverSelected);
        assert_eq!(engine.driver_name(), Some("mock"));
        assert_eq!(counters.inits.get(), 1);
        assert!(!mock(&engine).initialized);
        assert!(matches!(engine.config_mut(), Err(EngineError::ConfigLocked)));

        engine.load_resource("a").unwrap();
        engine.install_callback(EventMask::QUIT, |_, _| {}).unwrap();
        assert!(matches!(
            engine.draw_image("a", 0, 0, 0, 0, 1, 1),
            Err(EngineError::NotInitialized { operation: "draw_image" })
        ));
        assert!(matches!(
            engine.fill_rect(0, 0, 1, 1, Rgb::white()),
            Err(EngineError::NotInitialized { .. })
        ));
        assert!(engine.present().is_err());
        assert!(engine.process_input().is_err());

        engine.start().unwrap();
        assert_eq!(engine.state(), Lifecycle::Running);
        assert_eq!(counters.inits.get(), 1);
        assert_eq!(engine.resource_count(), 1);
        assert_eq!(engine.dispatch(&Event::Quit).unwrap(), 1);
        engine.draw_image("a", 0, 0, 0, 0, 1, 1).unwrap();
        assert_eq!(mock(&engine).loads, ["a"]);
    }

    #[test]
    fn select_driver_twice_is_ignored() {
        let (mut engine, counters) = mock_engine();
        engine.select_driver().unwrap();
        engine.select_driver().unwrap();
        assert_eq!(counters.inits.get(), 1);

        engine.start().unwrap();
        engine.select_driver().unwrap();
        assert_eq!(engine.state(), Lifecycle::Running);
    }

    #[test]
    fn shutdown_from_selected_frees_without_driver_cleanup() {
        let (mut engine, counters) = mock_engine();
        engine.select_driver().unwrap();
        engine.load_resource("a").unwrap();
        engine.load_resource("b").unwrap();

        engine.shutdown();
        assert_eq!(engine.state(), Lifecycle::Uninitialized);
        assert_eq!(engine.resource_count(), 0);
        assert_eq!(engine.driver_name(), None);
        assert_eq!(counters.cleanups.get(), 1);
        assert!(engine.config_mut().is_ok());
    }

    #[test]
    fn failed_start_after_selection_drops_registrations() {
        let counters = Counters::default();
        let backends = Backends::default()
            .with_registry(DriverRegistry::new(FAILING_ONLY))
            .with_base(RecordingBase(counters.clone()));
        let mut engine = Engine::new(config(), backends);

        engine.select_driver().unwrap();
        assert_eq!(engine.driver_name(), Some("failing"));
        engine.load_resource("a").unwrap();
        engine.install_callback(EventMask::QUIT, |_, _| {}).unwrap();

        let err = engine.start().err().unwrap();
        assert!(matches!(err, EngineError::InitFailure { stage: InitStage::Driver, .. }));
        assert_eq!(engine.state(), Lifecycle::Uninitialized);
        assert_eq!(engine.resource_count(), 0);
        assert_eq!(counters.cleanups.get(), 1);
        assert!(engine.dispatch(&Event::Quit).is_err());
    }

    #[test]
    fn failed_driver_init_rolls_back_base() {
        let counters = Counters::default();
        let backends = Backends::default()
            .with_registry(DriverRegistry::new(FAILING_ONLY))
            .with_base(RecordingBase(counters.clone()));
        let mut engine = Engine::new(config(), backends);

        let err = engine.start().err().unwrap();
        assert!(matches!(err, EngineError::InitFailure { stage: InitStage::Driver, .. }));
        assert_eq!(engine.state(), Lifecycle::Uninitialized);
        assert_eq!(counters.cleanups.get(), 1);
        assert_eq!(engine.driver_name(), None);
    }

    #[test]
    fn empty_driver_table_fails_start() {
        let counters = Counters::default();
        let backends = Backends::default()
            .with_registry(DriverRegistry::new(EMPTY))
            .with_base(RecordingBase(counters.clone()));
        let mut engine = Engine::new(config(), backends);

        assert!(matches!(engine.start(), Err(EngineError::NoDriversAvailable)));
        assert_eq!(counters.cleanups.get(), 1);
    }

    #[test]
    fn failed_input_init_rolls_back_everything() {
        let counters = Counters::default();
        let backends = Backends::default()
            .with_registry(DriverRegistry::new(MOCK_ONLY))
            .with_base(RecordingBase(counters.clone()))
            .with_input(BrokenInput);
        let mut engine = Engine::new(config(), backends);

        let err = engine.start().err().unwrap();
        assert!(matches!(err, EngineError::InitFailure { stage: InitStage::Input, .. }));
        assert_eq!(engine.state(), Lifecycle::Uninitialized);
        assert_eq!(counters.cleanups.get(), 1);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let (mut engine, counters) = mock_engine();
        engine.start().unwrap();
        engine.load_resource("a").unwrap();
        engine.install_callback(EventMask::QUIT, |_, _| {}).unwrap();

        engine.shutdown();
        engine.shutdown();
        assert_eq!(counters.cleanups.get(), 1);
        assert_eq!(engine.resource_count(), 0);
        assert_eq!(engine.state(), Lifecycle::Uninitialized);
    }

    #[test]
    fn drop_shuts_down() {
        let (mut engine, counters) = mock_engine();
        engine.start().unwrap();
        drop(engine);
        assert_eq!(counters.cleanups.get(), 1);
    }

    // ── resources ─────────────────────────────────────────────────────────

    #[test]
    fn draw_loads_lazily_and_translates() {
        let mut engine = started();
        engine.draw_image("hero.png", 1, 2, 10, 10, 8, 8).unwrap();
        engine.draw_image("hero.png", 0, 0, 0, 0, 8, 8).unwrap();

        let m = mock(&engine);
        assert_eq!(m.loads, ["hero.png"]);
        assert_eq!(
            m.draws[0].1,
            ImageBlit { src_x: 2, src_y: 4, dst_x: 20, dst_y: 20, w: 16, h: 16 }
        );
        assert_eq!(m.draws[0].0, m.draws[1].0);
    }

    #[test]
    fn failed_load_is_recoverable() {
        let mut engine = started();
        let err = engine.draw_image("missing.png", 0, 0, 0, 0, 1, 1).err().unwrap();
        assert!(matches!(err, EngineError::LoadFailed { .. }));
        assert!(err.is_recoverable());
        assert_eq!(engine.resource_count(), 0);
        assert_eq!(engine.state(), Lifecycle::Running);
    }

    #[test]
    fn add_replace_and_delete_through_engine() {
        let mut engine = started();
        let first = engine.driver_as_mut::<MockDriver>().unwrap().make_payload("sprite");
        let second = engine.driver_as_mut::<MockDriver>().unwrap().make_payload("sprite");

        engine.add_resource("sprite", first).unwrap();
        engine.add_resource("sprite", second).unwrap();
        assert_eq!(payload_id(engine.resource("sprite").unwrap()), Some(2));
        assert_eq!(mock(&engine).freed, [1]);

        engine.delete_resource("sprite").unwrap();
        assert!(matches!(engine.delete_resource("sprite"), Err(EngineError::NotFound { .. })));
        assert_eq!(mock(&engine).freed, [1, 2]);
    }

    #[test]
    fn clear_resources_reports_count() {
        let mut engine = started();
        for key in ["a", "b", "k"] {
            engine.load_resource(key).unwrap();
        }
        assert_eq!(engine.clear_resources().unwrap(), 3);
        assert_eq!(engine.resource_count(), 0);
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn fill_and_present_reach_the_driver() {
        let mut engine = started();
        engine.fill_rect(10, 10, 5, 5, Rgb::white()).unwrap();
        engine.present().unwrap();

        let m = mock(&engine);
        assert_eq!(m.fills, [(Rect::new(20, 20, 10, 10), Rgb::white())]);
        assert_eq!(m.presents, 1);
    }

    #[test]
    fn software_driver_end_to_end() {
        let mut engine = Engine::new(EngineConfig::default(), Backends::default());
        engine.start().unwrap();
        assert_eq!(engine.driver_name(), Some("software"));

        engine
            .driver_as_mut::<SoftwareDriver>()
            .unwrap()
            .embed("tile", Image::solid(4, 4, Rgb::white()));
        engine.fill_rect(0, 0, 320, 200, Rgb::new(0, 0, 128)).unwrap();
        engine.draw_image("tile", 0, 0, 10, 10, 2, 2).unwrap();
        engine.present().unwrap();

        let sw = engine.driver_as::<SoftwareDriver>().unwrap();
        let front = sw.front_buffer();
        assert_eq!(front.pixel(20, 20), Some(Rgb::white()));
        assert_eq!(front.pixel(23, 23), Some(Rgb::white()));
        assert_eq!(front.pixel(24, 24), Some(Rgb::new(0, 0, 128)));
        assert_eq!(sw.frames_presented(), 1);
        assert_eq!(sw.live_images(), 1);
    }

    #[test]
    fn far_off_screen_drawing_leaves_the_frame_untouched() {
        let mut engine = Engine::new(EngineConfig::default(), Backends::default());
        engine.start().unwrap();
        engine
            .driver_as_mut::<SoftwareDriver>()
            .unwrap()
            .embed("tile", Image::solid(4, 4, Rgb::white()));

        assert!(engine.fill_rect(i32::MAX / 2, 0, 10, 10, Rgb::white()).is_ok());
        assert!(engine.fill_rect(0, i32::MAX / 2, 10, 10, Rgb::white()).is_ok());
        assert!(engine.fill_rect(-2_000_000_000, 0, 10, 10, Rgb::white()).is_ok());
        assert!(engine.draw_image("tile", 0, 0, i32::MAX / 2, 0, 2, 2).is_ok());
        assert!(engine.draw_image("tile", 0, 0, -2_000_000_000, 0, 2, 2).is_ok());
        assert!(engine.draw_image("tile", 0, 0, 0, -2_000_000_000, 2, 2).is_ok());
        assert!(engine.draw_image("tile", -2_000_000_000, 0, 0, 0, 2, 2).is_ok());
        engine.present().unwrap();

        let front = engine.driver_as::<SoftwareDriver>().unwrap().front_buffer();
        assert_eq!(front.width(), 640);
        assert!(front.pixels().iter().all(|&p| p == 0));
    }

    // ── input ─────────────────────────────────────────────────────────────

    #[test]
    fn process_input_dispatches_scripted_events() {
        let input = ScriptedInput::new();
        let feed = input.feed();
        let backends = Backends::default()
            .with_registry(DriverRegistry::new(MOCK_ONLY))
            .with_input(input);
        let mut engine = Engine::new(config(), backends);
        engine.start().unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine
            .install_callback(EventMask::MOUSE_MOTION | EventMask::QUIT, move |ev, _| {
                sink.borrow_mut().push(*ev)
            })
            .unwrap();

        feed.push(RawInput::PointerMoved { x: 100, y: 60 });
        feed.push(RawInput::PointerButton { button: crate::input::MouseButton::Left, edge: Edge::Down });
        feed.push(RawInput::Quit);

        assert_eq!(engine.process_input().unwrap(), 3);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], Event::MouseMotion(m) if (m.x, m.y) == (50, 30)));
        assert_eq!(seen[1], Event::Quit);
    }

    #[test]
    fn direct_dispatch_and_unload() {
        let mut engine = started();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = engine
            .install_callback(EventMask::QUIT, move |_, _| h.set(h.get() + 1))
            .unwrap();

        assert_eq!(engine.dispatch(&Event::Quit).unwrap(), 1);
        engine.unload_callback(id).unwrap();
        assert_eq!(engine.dispatch(&Event::Quit).unwrap(), 0);
        assert!(engine.unload_callback(id).is_err());
        assert_eq!(hits.get(), 1);
    }
}
