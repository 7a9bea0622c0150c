//! Build the generated C++ with the system compiler, and check how it behaves
//! at runtime.
//!
//! The compiler is taken from `CXX`, falling back to `c++`. The tests are
//! skipped when it cannot be started.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{self, Command};
use std::{env, fs};

use gammac::files::FileId;
use gammac::pass::surface_to_cpp::generate;
use gammac::surface::SourceFile;

const GAME_GM: &str = r#"
enum Direction [In, Out] { N, E, S, W }

enum Path [In, Out] { Win "C:\dir\", Tab "a\tb", Home "~" }

enum Text [Out] { Lines "a
b" }

union Action [Eq, Out] {
  Move(dir: Direction) "MOVE {}",
  Shoot(dir: Direction, strength: int) "SHOOT {} {}",
  Wait "WAIT",
}

struct Coord [Eq, Out] { x: int, y: int }
"#;

const MAIN_CPP: &str = r#"
#include "game.gm.hpp"

#include <iostream>
#include <sstream>
#include <string>

template <typename T> std::string show(const T &value) {
  std::ostringstream os;
  os << value;
  return os.str();
}

template <typename T> T read(const std::string &text) {
  std::istringstream is(text);
  T value;
  is >> value;
  return value;
}

int main() {
  std::cout << show(Direction::W) << "\n";

  std::cout << show(Action::Move(Direction::N)) << "\n";
  std::cout << show(Action::Shoot(Direction::E, 3)) << "\n";
  std::cout << show(Action::Wait()) << "\n";

  std::cout << (Action::Move(Direction::N) == Action::Move(Direction::E)) << "\n";
  std::cout << (Action::Move(Direction::N) == Action::Move(Direction::N)) << "\n";
  std::cout << (Action::Wait() == Action::Move(Direction::N)) << "\n";

  const Direction directions[] = {Direction::N, Direction::E, Direction::S, Direction::W};
  for (Direction direction : directions) {
    std::cout << (read<Direction>(show(direction)) == direction);
  }
  std::cout << "\n";

  std::cout << show(Path::Win) << "\n";
  std::cout << show(Path::Tab) << "\n";
  std::cout << (read<Path>(show(Path::Win)) == Path::Win)
            << (read<Path>(show(Path::Tab)) == Path::Tab)
            << (read<Path>("~") == Path::Home) << "\n";
  std::cout << show(Text::Lines) << "\n";

  std::cout << show(Coord(1, 2)) << "\n";
  std::cout << (Coord(1, 2) == Coord(1, 2)) << (Coord(1, 2) == Coord(2, 1)) << "\n";
  return 0;
}
"#;

const EXPECTED_STDOUT: &str = r#"W
MOVE N
SHOOT E 3
WAIT
0
1
0
1111
C:\dir\
a\tb
111
a
b
{ x: 1, y: 2 }
10
"#;

fn cxx() -> OsString {
    env::var_os("CXX").unwrap_or_else(|| OsString::from("c++"))
}

/// A fresh directory under the system temporary directory.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("gammac-{}-{name}", process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_artifacts(dir: &Path) {
    let file_id = FileId::try_from(1).unwrap();
    let source_file = SourceFile::parse(file_id, GAME_GM).unwrap();
    let artifacts = generate(&source_file, "game.gm").unwrap();

    fs::write(dir.join("game.gm.hpp"), artifacts.header).unwrap();
    fs::write(dir.join("game.gm.cpp"), artifacts.source).unwrap();
    fs::write(dir.join("main.cpp"), MAIN_CPP).unwrap();
}

#[test]
fn generated_code_runs() {
    let dir = scratch_dir("cpp-runtime");
    write_artifacts(&dir);

    let build = Command::new(cxx())
        .current_dir(&dir)
        .args(["-std=c++11", "-Wall", "-o", "game", "main.cpp", "game.gm.cpp"])
        .output();
    let build = match build {
        Ok(build) => build,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            eprintln!("skipping: no C++ compiler found ({error})");
            return;
        }
        Err(error) => panic!("failed to start the C++ compiler: {error}"),
    };
    assert!(
        build.status.success(),
        "C++ compilation failed:\n{}",
        String::from_utf8_lossy(&build.stderr),
    );
    let warnings = String::from_utf8_lossy(&build.stderr);
    assert!(!warnings.contains("escape sequence"), "{warnings}");

    let run = Command::new(dir.join("game")).output().unwrap();
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));
    assert_eq!(String::from_utf8_lossy(&run.stdout), EXPECTED_STDOUT);

    fs::remove_dir_all(&dir).unwrap();
}
