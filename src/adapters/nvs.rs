//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements the read-only [`ConfigPort`].  The module configuration is a
//! single `postcard` blob under `meshnag/modcfg`; whatever tool writes it
//! lives outside this firmware.  A missing blob or an NVS read error yields
//! [`ModuleConfig::default()`], which leaves the module disabled.

use crate::app::ports::{ConfigPort, StoreError};
use crate::config::ModuleConfig;
use log::info;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(target_os = "espidf")]
const CONFIG_NAMESPACE: &[u8] = b"meshnag\0";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"modcfg\0";
#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    blob: std::cell::RefCell<Option<Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(StoreError::IoError)` if flash initialisation fails
    /// unrecoverably.  On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, StoreError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 {
                    return Err(StoreError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(StoreError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                return Err(StoreError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            blob: std::cell::RefCell::new(None),
        })
    }

    /// Store a config blob in the simulated partition.
    #[cfg(not(target_os = "espidf"))]
    pub fn seed(&self, config: &ModuleConfig) {
        let bytes = postcard::to_allocvec(config).ok();
        *self.blob.borrow_mut() = bytes;
    }

    /// Store raw bytes in the simulated partition.
    #[cfg(not(target_os = "espidf"))]
    pub fn seed_raw(&self, bytes: &[u8]) {
        *self.blob.borrow_mut() = Some(bytes.to_vec());
    }

    #[cfg(target_os = "espidf")]
    fn read_blob() -> Result<Option<Vec<u8>>, i32> {
        let mut handle: nvs_handle_t = 0;
        // SAFETY: namespace is NUL-terminated; handle is a valid out-pointer.
        let ret = unsafe {
            nvs_open(
                CONFIG_NAMESPACE.as_ptr().cast(),
                nvs_open_mode_t_NVS_READONLY,
                &mut handle,
            )
        };
        if ret == ESP_ERR_NVS_NOT_FOUND as i32 {
            return Ok(None);
        }
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = (|| {
            let mut size: usize = 0;
            // SAFETY: first call only queries the size; key is NUL-terminated.
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY.as_ptr().cast(), core::ptr::null_mut(), &mut size)
            };
            if ret == ESP_ERR_NVS_NOT_FOUND as i32 {
                return Ok(None);
            }
            if ret != ESP_OK as i32 || size == 0 || size > MAX_BLOB_SIZE {
                return Err(ret);
            }
            let mut buf = vec![0u8; size];
            // SAFETY: buf holds exactly `size` bytes.
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(Some(buf))
        })();

        // SAFETY: handle was opened above and is closed exactly once.
        unsafe { nvs_close(handle) };
        result
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<ModuleConfig, StoreError> {
        #[cfg(not(target_os = "espidf"))]
        let stored = self.blob.borrow().clone();

        #[cfg(target_os = "espidf")]
        let stored = match Self::read_blob() {
            Ok(stored) => stored,
            Err(rc) => {
                warn!("NvsAdapter: NVS read error {}, using defaults", rc);
                None
            }
        };

        match stored {
            Some(bytes) => {
                let cfg: ModuleConfig = postcard::from_bytes(&bytes).map_err(|_| StoreError::Corrupted)?;
                info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            None => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(ModuleConfig::default())
            }
        }
    }
}
