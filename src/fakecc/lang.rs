//! Maps a source file extension to the clang `-x` language tag, per the
//! case-sensitive extension table.

use super::Mode;

pub fn infer(path: &str, mode: Mode) -> Option<&'static str> {
    let ext = path.rsplit('.').next().filter(|e| *e != path)?;
    Some(match ext {
        "c" => "c",
        "cc" | "cp" | "cpp" | "cxx" | "c++" | "C" | "CC" | "C++" | "txx" => "c++",
        "i" => match mode {
            Mode::Cxx => "c++-cpp-output",
            Mode::Cc => "c-cpp-output",
        },
        "ii" => "c++-cpp-output",
        "m" => "objective-c",
        "mi" => "objective-c-cpp-output",
        "mm" => "objective-c++",
        "mii" => "objective-c++-cpp-output",
        _ => return None,
    })
}
