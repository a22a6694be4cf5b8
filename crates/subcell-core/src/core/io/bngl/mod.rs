//! Reader and writer for the BNGL-like model DSL.

mod builder;
mod error;
mod reaction;
mod sections;

pub use builder::{ModelBuilder, species_name};
pub use error::BuildError;
pub use reaction::{ParsedReaction, parse_reaction};
pub use sections::{Section, SectionKind, split_sections};

use crate::core::io::traits::ModelFile;
use crate::core::models::entities::ReactionKind;
use crate::core::models::model::Model;
use std::io::{BufRead, Read, Write};

/// Model DSL codec backed by a [`ModelBuilder`].
#[derive(Debug, Clone, Default)]
pub struct BnglFile {
    builder: ModelBuilder,
}

impl BnglFile {
    pub fn new(builder: ModelBuilder) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &ModelBuilder {
        &self.builder
    }
}

impl ModelFile for BnglFile {
    type Error = BuildError;

    fn read_from(&self, reader: &mut impl BufRead) -> Result<Model, Self::Error> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.builder.build(&text)
    }

    fn write_to(&self, model: &Model, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "begin model")?;
        for kind in SectionKind::WRITE_ORDER {
            let lines = section_lines(model, kind);
            if lines.is_empty() {
                continue;
            }
            writeln!(writer)?;
            writeln!(writer, "begin {}", kind.title())?;
            for (line, annotation) in lines {
                if annotation.is_empty() {
                    writeln!(writer, "  {}", line)?;
                } else {
                    writeln!(writer, "  {} # {}", line, annotation)?;
                }
            }
            writeln!(writer, "end {}", kind.title())?;
        }
        writeln!(writer)?;
        writeln!(writer, "end model")?;
        Ok(())
    }
}

fn section_lines(model: &Model, kind: SectionKind) -> Vec<(String, &str)> {
    match kind {
        SectionKind::Parameters => model
            .parameters
            .iter()
            .map(|p| {
                let line = join_nonempty(&[p.name.as_str(), p.definition.as_str()]);
                (line, p.annotation.as_str())
            })
            .collect(),
        SectionKind::Compartments => model
            .structures
            .iter()
            .map(|s| {
                // Positional columns: an empty size keeps its slot as `-`.
                let dims = s.kind.map_or(0, |k| k.dimensions());
                let size = if s.size.is_empty() { "-" } else { s.size.as_str() };
                let mut line = format!("{} {} {}", s.name, dims, size);
                if !s.parent_name.is_empty() {
                    line.push(' ');
                    line.push_str(&s.parent_name);
                }
                (line, s.annotation.as_str())
            })
            .collect(),
        SectionKind::MoleculeTypes => model
            .molecules
            .iter()
            .map(|m| (m.definition.clone(), m.annotation.as_str()))
            .collect(),
        SectionKind::Species => model
            .species
            .iter()
            .map(|s| {
                let mut fields = vec![s.definition.as_str()];
                fields.extend(
                    model
                        .config
                        .conc_sources
                        .iter()
                        .map(|source| s.concentration.get(source).map_or("", String::as_str))
                        .take_while(|value| !value.is_empty()),
                );
                (fields.join(" "), s.annotation.as_str())
            })
            .collect(),
        SectionKind::Observables => model
            .observables
            .iter()
            .map(|o| {
                let line = format!("{} {} {}", o.kind.keyword(), o.name, o.definition);
                (line, o.annotation.as_str())
            })
            .collect(),
        SectionKind::Functions => model
            .functions
            .iter()
            .map(|f| {
                let line = format!("{}({}) = {}", f.name, f.argument, f.definition);
                (line, f.annotation.as_str())
            })
            .collect(),
        SectionKind::ReactionRules => model
            .reactions
            .iter()
            .map(|r| {
                let mut line = String::new();
                if !r.name.is_empty() {
                    line.push_str(&r.name);
                    line.push_str(": ");
                }
                line.push_str(&r.definition);
                line.push(' ');
                line.push_str(&r.kf);
                match r.kind {
                    ReactionKind::Bidirectional if !r.kr.is_empty() => {
                        line.push_str(", ");
                        line.push_str(&r.kr);
                    }
                    ReactionKind::TotalRate => line.push_str(" TotalRate"),
                    _ => {}
                }
                (line, r.annotation.as_str())
            })
            .collect(),
        SectionKind::Diffusions => model
            .diffusions
            .iter()
            .map(|d| {
                let line = format!("{} {} {}", d.name, d.definition, d.rate);
                (line, d.annotation.as_str())
            })
            .collect(),
    }
}

fn join_nonempty(fields: &[&str]) -> String {
    fields
        .iter()
        .filter(|f| !f.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::SequentialIdGenerator;
    use std::io::Cursor;
    use std::sync::Arc;
    use tempfile::tempdir;

    const MODEL: &str = "\
begin model
begin compartments
  ec   3  1e-12   # extracellular
  pm   2  1e-9   ec
  cyt  3  1e-15  pm
  nuc  1  1e-16  cyt
end compartments
begin parameters
  kon 1e6
  koff 0.1 # unbinding
  D_R 1e-14
end parameters
begin molecule types
  A(x)
  R(l,s~u~p)
end molecule types
begin species
  A(x)@cyt 100
  @pm:R(l) kon*10 5
end species
begin observables
  Molecules A_tot A()
end observables
begin functions
  rate(t) = kon * exp(-t)
end functions
begin reaction rules
  bind: A(x)@cyt + R(l)@pm <-> A(x!1)@cyt.R(l!1)@pm kon, koff
  A(x)@cyt <-> A(x)@pm kon
  deg: A()@cyt -> 0 rate() TotalRate
  A(x)@cyt -> 0 koff # decay
end reaction rules
begin diffusions
  dR @pm:R(l) D_R
end diffusions
end model
";

    fn codec() -> BnglFile {
        BnglFile::new(
            ModelBuilder::new()
                .with_id_generator(Arc::new(SequentialIdGenerator::new()))
                .with_conc_sources(vec!["default".into(), "ko".into()]),
        )
    }

    fn write(model: &Model) -> String {
        let mut out = Vec::new();
        codec().write_to(model, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parse_write_parse_reproduces_entities() {
        let first = codec().read_from(&mut Cursor::new(MODEL)).unwrap();
        let text = write(&first);
        let second = codec().read_from(&mut Cursor::new(text.as_str())).unwrap();
        assert_eq!(first, second);
        assert_eq!(write(&second), text);
    }

    #[test]
    fn writer_emits_canonical_lines() {
        let model = codec().read_from(&mut Cursor::new(MODEL)).unwrap();
        let text = write(&model);
        assert!(text.starts_with("begin model\n"));
        assert!(text.contains("\n  ec 3 1e-12 # extracellular\n"));
        assert!(text.contains("\n  nuc 0 1e-16 cyt\n"));
        assert!(text.contains("\n  @pm:R(l) kon*10 5\n"));
        assert!(text.contains("\n  A(x)@cyt 100\n"));
        assert!(text.contains("\n  rate(t) = kon * exp(-t)\n"));
        assert!(text.contains("\n  deg: A()@cyt -> 0 rate() TotalRate\n"));
        assert!(text.contains("\n  A(x)@cyt <-> A(x)@pm kon\n"));
        assert!(text.contains("\n  A(x)@cyt -> 0 koff # decay\n"));
        assert!(text.find("begin parameters") < text.find("begin compartments"));
        assert!(text.trim_end().ends_with("end model"));
    }

    #[test]
    fn edited_structure_keeps_its_columns() {
        let mut model = codec().read_from(&mut Cursor::new(MODEL)).unwrap();
        let cyt = model.structures.iter_mut().find(|s| s.name == "cyt").unwrap();
        cyt.size.clear();
        cyt.kind = None;

        let text = write(&model);
        assert!(text.contains("\n  cyt 0 - pm\n"));

        let reread = codec().read_from(&mut Cursor::new(text.as_str())).unwrap();
        let cyt = reread.structure("cyt").unwrap();
        assert_eq!(cyt.size, "");
        assert_eq!(cyt.parent_name, "pm");
        assert_eq!(cyt.kind, None);
        assert_eq!(reread.structures, model.structures);
    }

    #[test]
    fn empty_sections_are_omitted() {
        let model = codec()
            .read_from(&mut Cursor::new("begin parameters\nk 1\nend parameters"))
            .unwrap();
        let text = write(&model);
        assert!(text.contains("begin parameters"));
        assert!(!text.contains("begin species"));
    }

    #[test]
    fn path_helpers_round_trip_through_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.bngl");
        std::fs::write(&path, MODEL).unwrap();

        let model = codec().read_from_path(&path).unwrap();
        let out = dir.path().join("out.bngl");
        codec().write_to_path(&model, &out).unwrap();
        let reread = codec().read_from_path(&out).unwrap();
        assert_eq!(model, reread);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = codec().read_from_path(dir.path().join("absent.bngl")).unwrap_err();
        assert!(matches!(err, BuildError::Io(_)));
    }
}
