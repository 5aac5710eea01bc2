//! Camera adapter — implements [`CapturePort`] over the esp32-camera
//! component.
//!
//! One JPEG still per `capture()`.  The frame buffer is copied out and
//! handed back to the driver immediately, so at most one buffer is held
//! per call.  Every successful capture is also written to the configured
//! artifact path, overwriting the previous one; a failed write is logged
//! and the in-memory artifact is still returned.
//!
//! - **`target_os = "espidf"`** — `esp_camera_fb_get()` /
//!   `esp_camera_fb_return()`; [`init_camera`] must have run first.
//! - **`not(target_os = "espidf")`** — frames come from a queue filled
//!   with [`CameraAdapter::sim_queue`]; an empty queue reads as
//!   `HardwareUnavailable`.
//!
//! A camera that failed to initialise is marked with
//! [`CameraAdapter::mark_unavailable`]; every capture then reports
//! `HardwareUnavailable` without touching the driver, and the station keeps
//! cycling back to "Ready".

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::model::ImageArtifact;
use crate::app::ports::CapturePort;
use crate::error::CaptureError;

pub struct CameraAdapter {
    artifact_path: PathBuf,
    captures: u32,
    available: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_frames: std::collections::VecDeque<Result<Vec<u8>, CaptureError>>,
}

impl CameraAdapter {
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            captures: 0,
            available: true,
            #[cfg(not(target_os = "espidf"))]
            sim_frames: std::collections::VecDeque::new(),
        }
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Stop calling into the camera driver; captures fail from now on.
    pub fn mark_unavailable(&mut self) {
        self.available = false;
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Successful captures since boot.
    pub fn captures(&self) -> u32 {
        self.captures
    }

    /// Queue the result of the next simulated capture.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_queue(&mut self, frame: Result<Vec<u8>, CaptureError>) {
        self.sim_frames.push_back(frame);
    }

    #[cfg(target_os = "espidf")]
    fn grab_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
        use esp_idf_svc::sys::camera;

        // SAFETY: the driver was initialised by `init_camera`; the buffer
        // is copied before being returned and never touched afterwards.
        unsafe {
            let fb = camera::esp_camera_fb_get();
            if fb.is_null() {
                return Err(CaptureError::BufferUnavailable);
            }
            let bytes = core::slice::from_raw_parts((*fb).buf, (*fb).len).to_vec();
            camera::esp_camera_fb_return(fb);
            Ok(bytes)
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn grab_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
        self.sim_frames
            .pop_front()
            .unwrap_or(Err(CaptureError::HardwareUnavailable))
    }

    fn store(&self, bytes: &[u8]) {
        if let Err(e) = std::fs::write(&self.artifact_path, bytes) {
            warn!(
                "camera: could not write {}: {}",
                self.artifact_path.display(),
                e
            );
        }
    }
}

impl CapturePort for CameraAdapter {
    fn capture(&mut self) -> Result<ImageArtifact, CaptureError> {
        if !self.available {
            return Err(CaptureError::HardwareUnavailable);
        }
        let bytes = self.grab_frame()?;
        if bytes.is_empty() {
            return Err(CaptureError::EmptyFrame);
        }
        self.store(&bytes);
        self.captures = self.captures.wrapping_add(1);
        info!("camera: captured {} bytes", bytes.len());
        Ok(ImageArtifact::new(bytes))
    }
}

// ── ESP-IDF bring-up ──────────────────────────────────────────

/// Configure the OV2640 for JPEG stills and apply the image tuning.
#[cfg(target_os = "espidf")]
pub fn init_camera() -> Result<(), CaptureError> {
    use esp_idf_svc::sys::{self, camera};

    use crate::pins;

    let [d0, d1, d2, d3, d4, d5, d6, d7] = pins::CAM_DATA_GPIOS;
    let config = camera::camera_config_t {
        pin_pwdn: pins::CAM_PWDN_GPIO,
        pin_reset: pins::CAM_RESET_GPIO,
        pin_xclk: pins::CAM_XCLK_GPIO,
        __bindgen_anon_1: camera::camera_config_t__bindgen_ty_1 {
            pin_sccb_sda: pins::CAM_SIOD_GPIO,
        },
        __bindgen_anon_2: camera::camera_config_t__bindgen_ty_2 {
            pin_sccb_scl: pins::CAM_SIOC_GPIO,
        },
        pin_d7: d7,
        pin_d6: d6,
        pin_d5: d5,
        pin_d4: d4,
        pin_d3: d3,
        pin_d2: d2,
        pin_d1: d1,
        pin_d0: d0,
        pin_vsync: pins::CAM_VSYNC_GPIO,
        pin_href: pins::CAM_HREF_GPIO,
        pin_pclk: pins::CAM_PCLK_GPIO,
        xclk_freq_hz: pins::CAM_XCLK_FREQ_HZ,
        // Timer 0 / channels 0-3 belong to the servos.
        ledc_timer: sys::ledc_timer_t_LEDC_TIMER_1,
        ledc_channel: sys::ledc_channel_t_LEDC_CHANNEL_4,
        pixel_format: camera::pixformat_t_PIXFORMAT_JPEG,
        frame_size: camera::framesize_t_FRAMESIZE_SVGA,
        jpeg_quality: 10,
        fb_count: 1,
        fb_location: camera::camera_fb_location_t_CAMERA_FB_IN_PSRAM,
        grab_mode: camera::camera_grab_mode_t_CAMERA_GRAB_LATEST,
        ..Default::default()
    };

    // SAFETY: called once from main before the controller starts.
    unsafe {
        if camera::esp_camera_init(&config) != sys::ESP_OK {
            return Err(CaptureError::HardwareUnavailable);
        }
        let sensor = camera::esp_camera_sensor_get();
        if !sensor.is_null() {
            if let Some(set_contrast) = (*sensor).set_contrast {
                set_contrast(sensor, 2);
            }
            if let Some(set_brightness) = (*sensor).set_brightness {
                set_brightness(sensor, 1);
            }
            if let Some(set_special_effect) = (*sensor).set_special_effect {
                set_special_effect(sensor, 0);
            }
        }
    }
    info!("camera: OV2640 ready (SVGA JPEG)");
    Ok(())
}

/// Mount the SPIFFS partition that holds the capture artifact.
#[cfg(target_os = "espidf")]
pub fn mount_artifact_fs() -> Result<(), crate::error::Error> {
    use esp_idf_svc::sys;

    let conf = sys::esp_vfs_spiffs_conf_t {
        base_path: c"/spiffs".as_ptr(),
        partition_label: core::ptr::null(),
        max_files: 2,
        format_if_mount_failed: true,
    };
    // SAFETY: `conf` outlives the call; the VFS copies what it keeps.
    if unsafe { sys::esp_vfs_spiffs_register(&conf) } != sys::ESP_OK {
        return Err(crate::error::Error::Init("spiffs mount failed"));
    }
    info!("camera: artifact store mounted at /spiffs");
    Ok(())
}
