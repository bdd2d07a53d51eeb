//! Per-library, per-platform command tables.
//!
//! Lookup takes the first entry whose library and platform match, so
//! OS-specific entries sit before the `Platforms::Any` fallback.

use crate::library::Library;
use crate::platform::Os;

use super::types::{Arg, CleanRecipe, EnvSpec, Platforms, Recipe, StepSpec, Val, When, arg, env, lit, splice, when};

const OPENSSL_CONFIGURE_FLAGS: &[Arg] = &[
  arg(Val::OwnDist("--prefix=", "")),
  arg(Val::OwnDist("--openssldir=", "")),
  lit("no-shared"),
  lit("no-dso"),
  lit("no-zlib"),
];

const OPENSSL_MAKE: &[StepSpec] = &[
  StepSpec {
    program: "make",
    args: &[lit("depend")],
  },
  StepSpec {
    program: "make",
    args: &[arg(Val::Jobs)],
  },
  StepSpec {
    program: "make",
    args: &[lit("install_sw")],
  },
];

const MAKE_INSTALL: &[StepSpec] = &[
  StepSpec {
    program: "make",
    args: &[arg(Val::Jobs)],
  },
  StepSpec {
    program: "make",
    args: &[lit("install")],
  },
];

const AUTOGEN: StepSpec = StepSpec {
  program: "sh",
  args: &[lit("-l"), lit("./autogen.sh")],
};

const CROSS_HOST: Arg = when(When::Cross, Val::Host("--host="));

pub static BUILD_RECIPES: &[Recipe] = &[
  Recipe {
    library: Library::OpenSsl,
    platforms: Platforms::On(Os::Windows),
    env: &[],
    configure: &[StepSpec {
      program: "perl",
      args: &[lit("./Configure"), splice(OPENSSL_CONFIGURE_FLAGS), lit("mingw64")],
    }],
    make: OPENSSL_MAKE,
  },
  Recipe {
    library: Library::OpenSsl,
    platforms: Platforms::On(Os::MacOs),
    env: &[],
    configure: &[StepSpec {
      program: "perl",
      args: &[lit("./Configure"), splice(OPENSSL_CONFIGURE_FLAGS), arg(Val::TlsTarget)],
    }],
    make: OPENSSL_MAKE,
  },
  Recipe {
    library: Library::OpenSsl,
    platforms: Platforms::Any,
    env: &[],
    configure: &[StepSpec {
      program: "sh",
      args: &[lit("./config"), splice(OPENSSL_CONFIGURE_FLAGS)],
    }],
    make: OPENSSL_MAKE,
  },
  Recipe {
    library: Library::Libevent,
    platforms: Platforms::Any,
    env: &[],
    configure: &[
      AUTOGEN,
      StepSpec {
        program: "sh",
        args: &[
          lit("./configure"),
          arg(Val::OwnDist("--prefix=", "")),
          lit("--disable-shared"),
          lit("--enable-static"),
          lit("--with-pic"),
          lit("--disable-samples"),
          lit("--disable-libevent-regress"),
          arg(Val::DepDist("CPPFLAGS=-I", Library::OpenSsl, "/include")),
          arg(Val::DepDist("LDFLAGS=-L", Library::OpenSsl, "/lib")),
          CROSS_HOST,
        ],
      },
    ],
    make: MAKE_INSTALL,
  },
  // zlib's configure script does not work under MinGW; its win32 makefile
  // takes the install layout from the environment instead.
  Recipe {
    library: Library::Zlib,
    platforms: Platforms::On(Os::Windows),
    env: &[
      env("PREFIX", Val::OwnDist("", "")),
      env("BINARY_PATH", Val::OwnDist("", "/bin")),
      env("INCLUDE_PATH", Val::OwnDist("", "/include")),
      env("LIBRARY_PATH", Val::OwnDist("", "/lib")),
    ],
    configure: &[],
    make: &[
      StepSpec {
        program: "make",
        args: &[lit("-fwin32/Makefile.gcc")],
      },
      StepSpec {
        program: "make",
        args: &[lit("install"), lit("-fwin32/Makefile.gcc")],
      },
    ],
  },
  Recipe {
    library: Library::Zlib,
    platforms: Platforms::Any,
    env: &[],
    configure: &[StepSpec {
      program: "sh",
      args: &[lit("./configure"), arg(Val::OwnDist("--prefix=", "")), lit("--static")],
    }],
    make: MAKE_INSTALL,
  },
  Recipe {
    library: Library::Xz,
    platforms: Platforms::Any,
    env: &[EnvSpec {
      when: When::On(Os::MacOs),
      name: "PATH",
      val: Val::ToolPath,
    }],
    configure: &[
      StepSpec {
        program: "sh",
        args: &[lit("-l"), lit("./autogen.sh"), lit("--no-po4a")],
      },
      StepSpec {
        program: "sh",
        args: &[
          lit("./configure"),
          arg(Val::OwnDist("--prefix=", "")),
          lit("--disable-shared"),
          lit("--enable-static"),
          lit("--disable-doc"),
          lit("--disable-scripts"),
          lit("--disable-xz"),
          lit("--disable-xzdec"),
          lit("--disable-lzmadec"),
          lit("--disable-lzmainfo"),
          lit("--disable-lzma-links"),
          CROSS_HOST,
        ],
      },
    ],
    make: MAKE_INSTALL,
  },
  Recipe {
    library: Library::Tor,
    platforms: Platforms::Any,
    env: &[
      env("LDFLAGS", Val::Lit("-s")),
      EnvSpec {
        when: When::On(Os::Windows),
        name: "LIBS",
        val: Val::Lit("-lcrypt32 -lgdi32"),
      },
    ],
    configure: &[
      AUTOGEN,
      StepSpec {
        program: "sh",
        args: &[
          lit("./configure"),
          arg(Val::OwnDist("--prefix=", "")),
          lit("--disable-gcc-hardening"),
          lit("--disable-system-torrc"),
          lit("--disable-asciidoc"),
          lit("--enable-static-libevent"),
          arg(Val::DepDist("--with-libevent-dir=", Library::Libevent, "")),
          lit("--enable-static-openssl"),
          arg(Val::DepDist("--with-openssl-dir=", Library::OpenSsl, "")),
          lit("--enable-static-zlib"),
          arg(Val::DepDist("--with-zlib-dir=", Library::Zlib, "")),
          lit("--disable-systemd"),
          lit("--disable-lzma"),
          lit("--disable-seccomp"),
          lit("--disable-html-manual"),
          lit("--disable-manpage"),
          CROSS_HOST,
          when(When::On(Os::MacOs), Val::Lit("--disable-zstd")),
          when(When::On(Os::MacOs), Val::Lit("--disable-libscrypt")),
          when(When::CrossOn(Os::MacOs), Val::Lit("--disable-tool-name-check")),
          when(When::NotOn(Os::MacOs), Val::Lit("--enable-static-tor")),
          when(When::On(Os::Windows), Val::Lit("--disable-zstd")),
        ],
      },
    ],
    make: MAKE_INSTALL,
  },
];

const MAKE_CLEAN: &[Arg] = &[lit("clean")];

pub static CLEAN_RECIPES: &[CleanRecipe] = &[
  // `make clean` leaves previously installed libraries in place.
  CleanRecipe {
    library: Library::OpenSsl,
    platforms: Platforms::Any,
    control_file: "Makefile",
    purge: &["dist/lib"],
    env: &[],
    args: MAKE_CLEAN,
  },
  CleanRecipe {
    library: Library::Libevent,
    platforms: Platforms::Any,
    control_file: "Makefile",
    purge: &[],
    env: &[],
    args: MAKE_CLEAN,
  },
  CleanRecipe {
    library: Library::Zlib,
    platforms: Platforms::On(Os::Windows),
    control_file: "win32/Makefile.gcc",
    purge: &[],
    env: &[env("PREFIX", Val::OwnDist("", ""))],
    args: &[lit("clean"), lit("-fwin32/Makefile.gcc")],
  },
  CleanRecipe {
    library: Library::Zlib,
    platforms: Platforms::Any,
    control_file: "Makefile",
    purge: &[],
    env: &[env("PREFIX", Val::OwnDist("", ""))],
    args: MAKE_CLEAN,
  },
  CleanRecipe {
    library: Library::Xz,
    platforms: Platforms::Any,
    control_file: "Makefile",
    purge: &[],
    env: &[],
    args: MAKE_CLEAN,
  },
  CleanRecipe {
    library: Library::Tor,
    platforms: Platforms::Any,
    control_file: "Makefile",
    purge: &[],
    env: &[],
    args: MAKE_CLEAN,
  },
];
