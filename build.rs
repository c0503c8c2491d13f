use std::env;
use std::path::PathBuf;

// ffmpeg-sys-next finds FFmpeg through pkg-config everywhere except Windows,
// where it needs FFMPEG_DIR. Point at a vcpkg install when we can see one.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows"
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=framesight needs FFmpeg: set FFMPEG_DIR, or install ffmpeg with vcpkg and set VCPKG_ROOT."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);

    if candidate.join("include").join("libavcodec").exists() {
        println!(
            "cargo:warning=Found vcpkg FFmpeg at {}; set FFMPEG_DIR to it if the ffmpeg-sys-next build cannot locate the libraries.",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=No FFmpeg headers under {}; install with `vcpkg install ffmpeg`.",
            candidate.display()
        );
    }
}
