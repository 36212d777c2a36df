//! WAV player firmware - hardware entry point for STM32H743ZI.
//!
//! Linear boot flow: mount → boot file → root listing → audio setup →
//! playback → teardown → delayed system reset. Every setup failure is fatal:
//! `run()` returns the cause to `main()`, which logs it and takes the same
//! delayed reset as the success path.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_stm32::dma::NoDma;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::sai::{self, Sai};
use embassy_stm32::spi::{Config as SpiConfig, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::Peripherals;
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

use firmware::audio::{sai_config, SaiAudioOut, SAI_DMA_BUFFER_LEN};
use firmware::boot::{self, PlayerSettings, StartupError, TRANSFER_BUFFER_SAMPLES};
use firmware::storage::mount_sd;
use platform::audio::AudioOutput;
use platform::storage::Storage;

// Logger and panic handler
use defmt_rtt as _;
use panic_probe as _;

// SAI DMA ring buffer. Must live in AXI SRAM: DMA1 cannot reach DTCM, and a
// buffer placed there corrupts silently or bus-faults.
#[link_section = ".axisram"]
static mut SAI_DMA_BUF: [u16; SAI_DMA_BUFFER_LEN] = [0; SAI_DMA_BUFFER_LEN];

// Transfer buffer for the read/write cycle; static so the 4 KB stays off the
// task stack.
static TRANSFER_BUF: StaticCell<[i16; TRANSFER_BUFFER_SAMPLES]> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    defmt::info!("wav-player v{=str} starting", env!("CARGO_PKG_VERSION"));
    defmt::info!("target: STM32H743ZI — Cortex-M7 @ 400 MHz");

    let p = embassy_stm32::init(boot::build_embassy_config());
    let settings = PlayerSettings::default();

    match run(p, &settings).await {
        Ok(()) => defmt::info!("playback complete"),
        Err(e) => defmt::error!("startup failed: {}", e),
    }

    defmt::info!("rebooting in {=u64} ms...", settings.reboot_delay_ms);
    Timer::after(Duration::from_millis(settings.reboot_delay_ms)).await;
    cortex_m::peripheral::SCB::sys_reset();
}

async fn run(p: Peripherals, settings: &PlayerSettings) -> Result<(), StartupError> {
    settings.validate().map_err(StartupError::Settings)?;

    // ── Storage: SD card on SPI2 ────────────────────────────────────────────
    // PB13 = SPI2_SCK, PB15 = SPI2_MOSI, PB14 = SPI2_MISO, PB12 = card CS.
    // The card initialisation sequence requires a 100-400 kHz bus clock.
    defmt::info!("mounting SD card volume");
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = Hertz(400_000);
    let spi = Spi::new(p.SPI2, p.PB13, p.PB15, p.PB14, NoDma, NoDma, spi_config);
    let cs = Output::new(p.PB12, Level::High, Speed::VeryHigh);

    let mut storage = mount_sd(spi, cs).map_err(|e| {
        defmt::error!("mount failed: {}", e);
        StartupError::Mount(e)
    })?;

    match storage.usage().await {
        Ok(u) => defmt::info!(
            "volume size: total {=u64}, used {=u64}",
            u.total_bytes,
            u.used_bytes
        ),
        Err(_) => return Err(StartupError::Storage),
    }

    // Boot diagnostic file, overwritten on every startup.
    storage
        .write_file(settings.boot_file, settings.boot_message)
        .await
        .map_err(|_| StartupError::Storage)?;
    defmt::info!("boot file written: {=str}", settings.boot_file);

    defmt::info!("files in volume root:");
    storage
        .list_root(|entry| {
            if entry.is_dir {
                defmt::info!("  {=str}/", entry.name.as_str());
            } else {
                defmt::info!("  {=str} ({=u32} bytes)", entry.name.as_str(), entry.size_bytes);
            }
        })
        .await
        .map_err(|_| StartupError::Storage)?;

    // ── Audio: SAI1 Block A, master transmitter ─────────────────────────────
    defmt::info!("setting up audio output");
    let sai_cfg = sai_config(&settings.audio).map_err(|_| StartupError::Audio)?;
    let (sub_block_a, _sub_block_b) = sai::split_subblocks(p.SAI1);
    // SAFETY: SAI_DMA_BUF is referenced exactly once, here, before any other
    // task exists.
    let dma_buf: &'static mut [u16] = unsafe { &mut *core::ptr::addr_of_mut!(SAI_DMA_BUF) };
    let sai_driver = Sai::new_asynchronous_with_mclk(
        sub_block_a,
        p.PE5, // SCK
        p.PE6, // SD
        p.PE4, // FS
        p.PE2, // MCLK
        p.DMA1_CH0,
        dma_buf,
        sai_cfg,
    );
    let mut audio = SaiAudioOut::new(sai_driver, settings.audio);
    audio
        .configure(&settings.audio)
        .await
        .map_err(|_| StartupError::Audio)?;

    // ── Playback ────────────────────────────────────────────────────────────
    defmt::info!("playing {=str}", settings.wav_path);
    let buf_full = TRANSFER_BUF.init([0i16; TRANSFER_BUFFER_SAMPLES]);
    let Some(buf) = buf_full.get_mut(..settings.buffer_samples) else {
        return Err(StartupError::Settings(firmware::SettingsError::BufferSize));
    };

    let session = playback::open_stream(&mut storage, settings.wav_path)
        .await
        .map_err(|e| {
            defmt::error!("open {=str}: {}", settings.wav_path, e);
            StartupError::Playback(e)
        })?;
    let info = session.info();
    defmt::info!(
        "wav: {=u32} Hz, {=u16} ch, {=u16} bit, {=u32} payload bytes",
        info.sample_rate_hz,
        info.channels,
        info.bits_per_sample,
        info.data_bytes
    );
    if !info.matches(&settings.audio) {
        defmt::warn!("header format differs from configured output; playing as configured");
    }

    let report = playback::stream(session, &mut storage, &mut audio, buf)
        .await
        .map_err(StartupError::Playback)?;
    defmt::info!(
        "streamed {=u64} samples in {=u32} writes",
        report.samples,
        report.writes
    );

    // Tear down the output channel.
    drop(audio);

    Ok(())
}
