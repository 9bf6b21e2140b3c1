//! The declaration environment: every type name and function overload
//! known to the program, plus the passes that populate, validate, and
//! type-infer it. Grounded on `compile/env.go`, `compile/validate.go`,
//! and `compile/infer.go`.
use std::collections::HashMap;

use tracing::debug;

use crate::ast::Expr;
use crate::ast_build::Declaration;
use crate::error::{Error, ErrorKind};
use crate::identifier::Name;
use crate::infer::{ambiguity_witness, infer};
use crate::source::SourceInfo;
use crate::specialize::is_more_specific;
use crate::types::{Alternative, AliasDecl, RecordDecl, Type, TypeDecl, UnionDecl};
use crate::unify::{can_unify, unify};
use crate::varset::free_vars;

/// One admissible signature for a function name. [`FuncImpl::Native`]
/// covers record/union constructors, field getters and setters: the
/// environment only needs their type, since the linker wires their
/// behavior to the runtime's built-in operations rather than to a
/// compiled body.
#[derive(Clone, Debug)]
pub enum FuncImpl {
    Source { info: SourceInfo, ty: Type, body: Expr },
    Native { info: SourceInfo, ty: Type },
}

impl FuncImpl {
    pub fn ty(&self) -> &Type {
        match self {
            FuncImpl::Source { ty, .. } => ty,
            FuncImpl::Native { ty, .. } => ty,
        }
    }

    pub fn info(&self) -> &SourceInfo {
        match self {
            FuncImpl::Source { info, .. } => info,
            FuncImpl::Native { info, .. } => info,
        }
    }
}

#[derive(Default)]
pub struct Env {
    pub names: HashMap<Name, TypeDecl>,
    pub funcs: HashMap<Name, Vec<FuncImpl>>,
}

impl Env {
    pub fn new() -> Env {
        let mut names = HashMap::new();
        for builtin in ["Char", "Int", "Float"] {
            names.insert(Name::new(builtin), TypeDecl::Builtin(0));
        }
        let mut env = Env { names, funcs: HashMap::new() };
        env.seed_builtins();
        env
    }

    /// Registers the arithmetic, comparison, conversion, `error` and
    /// `dump` overloads every program can call without declaring them,
    /// before any source declaration is added. Their bodies are
    /// synthesized later by `native::synthesize`; `add_func`'s
    /// overload-collision check still applies, so two builtins can
    /// never unify to the same signature by accident.
    fn seed_builtins(&mut self) {
        let dummy = SourceInfo::new("<builtin>".into(), 0, 0);
        for (name, ty) in crate::native::prelude_signatures() {
            self.add_func(name, FuncImpl::Native { info: dummy.clone(), ty })
                .expect("prelude signatures never collide with each other");
        }
        self.seed_list_prelude(&dummy);
    }

    /// Registers the standard `List` union so `::` and `empty`, the
    /// names `spec.md` §4.3 says list literals desugar into without
    /// defining, resolve out of the box instead of requiring every
    /// program to redeclare `List` before using `[1, 2, 3]` syntax
    /// (`SPEC_FULL.md` §4.15).
    fn seed_list_prelude(&mut self, info: &SourceInfo) {
        let elem = Name::new("__native_list_a");
        let list_ty = Type::Appl(Name::new("List"), vec![Type::Var(elem.clone())]);
        let union = UnionDecl {
            info: info.clone(),
            args: vec![elem.clone()],
            alternatives: vec![
                Alternative { info: info.clone(), name: Name::new("empty"), fields: Vec::new() },
                Alternative {
                    info: info.clone(),
                    name: Name::new("::"),
                    fields: vec![Type::Var(elem), list_ty],
                },
            ],
        };
        self.add_union(Name::new("List"), union).expect("prelude List union never collides");
    }

    /// Folds a batch of parsed declarations into the environment,
    /// collecting every error rather than stopping at the first
    /// (`spec.md` §7's propagation policy).
    pub fn add_all(&mut self, decls: Vec<Declaration>) -> Vec<Error> {
        let mut errs = Vec::new();
        for decl in decls {
            if let Err(e) = self.add(decl) {
                errs.push(e);
            }
        }
        errs
    }

    pub fn add(&mut self, decl: Declaration) -> Result<(), Error> {
        match decl {
            Declaration::Record(name, record) => self.add_record(name, record),
            Declaration::Union(name, union) => self.add_union(name, union),
            Declaration::Alias(name, alias) => self.add_alias(name, alias),
            Declaration::Func { name, info, ty, body } => {
                self.add_func(name, FuncImpl::Source { info, ty, body })
            }
        }
    }

    fn add_record(&mut self, name: Name, record: RecordDecl) -> Result<(), Error> {
        if let Some(existing) = self.names.get(&name) {
            return Err(Error::at(
                record.info.clone(),
                ErrorKind::DuplicateTypeName { name, previous: existing.info().cloned() },
            ));
        }
        let record_ty = Type::Appl(name.clone(), record.args.iter().cloned().map(Type::Var).collect());

        let constructor_ty = record
            .fields
            .iter()
            .rev()
            .fold(record_ty.clone(), |acc, field| Type::func(field.ty.clone(), acc));
        self.add_func(name.clone(), FuncImpl::Native { info: record.info.clone(), ty: constructor_ty })?;

        for field in &record.fields {
            self.add_func(
                field.name.clone(),
                FuncImpl::Native {
                    info: field.info.clone(),
                    ty: Type::func(record_ty.clone(), field.ty.clone()),
                },
            )?;
        }
        for field in &record.fields {
            self.add_func(
                field.name.clone(),
                FuncImpl::Native {
                    info: field.info.clone(),
                    ty: Type::func(field.ty.clone(), Type::func(record_ty.clone(), record_ty.clone())),
                },
            )?;
        }

        self.names.insert(name, TypeDecl::Record(record));
        Ok(())
    }

    fn add_union(&mut self, name: Name, union: UnionDecl) -> Result<(), Error> {
        if let Some(existing) = self.names.get(&name) {
            return Err(Error::at(
                union.info.clone(),
                ErrorKind::DuplicateTypeName { name, previous: existing.info().cloned() },
            ));
        }
        let union_ty = Type::Appl(name.clone(), union.args.iter().cloned().map(Type::Var).collect());

        for alt in &union.alternatives {
            let alt_ty = alt
                .fields
                .iter()
                .rev()
                .fold(union_ty.clone(), |acc, field| Type::func(field.clone(), acc));
            self.add_func(alt.name.clone(), FuncImpl::Native { info: alt.info.clone(), ty: alt_ty })?;
        }

        self.names.insert(name, TypeDecl::Union(union));
        Ok(())
    }

    fn add_alias(&mut self, name: Name, alias: AliasDecl) -> Result<(), Error> {
        if let Some(existing) = self.names.get(&name) {
            return Err(Error::at(
                alias.info.clone(),
                ErrorKind::DuplicateTypeName { name, previous: existing.info().cloned() },
            ));
        }
        self.names.insert(name, TypeDecl::Alias(alias));
        Ok(())
    }

    fn add_func(&mut self, name: Name, imp: FuncImpl) -> Result<(), Error> {
        for existing in self.funcs.get(&name).into_iter().flatten() {
            if can_unify(&self.names, imp.ty(), existing.ty()) {
                return Err(Error::at(
                    imp.info().clone(),
                    ErrorKind::DuplicateSignature { name, previous: Some(existing.info().clone()) },
                ));
            }
        }
        self.funcs.entry(name).or_default().push(imp);
        Ok(())
    }

    /// Arity/boundedness/distinctness checks over every declared type
    /// and function signature, batching failures.
    pub fn validate(&self) -> Vec<Error> {
        let mut errs = Vec::new();

        for decl in self.names.values() {
            match decl {
                TypeDecl::Builtin(_) => {}
                TypeDecl::Record(r) => {
                    self.validate_args(&r.info, &r.args, &mut errs);
                    for (i, f1) in r.fields.iter().enumerate() {
                        for f2 in &r.fields[..i] {
                            if f1.name == f2.name {
                                errs.push(Error::at(
                                    f1.info.clone(),
                                    ErrorKind::DuplicateField { name: f1.name.clone(), previous: f2.info.clone() },
                                ));
                            }
                        }
                        self.validate_type(&r.args, &f1.ty, &mut errs);
                    }
                }
                TypeDecl::Union(u) => {
                    self.validate_args(&u.info, &u.args, &mut errs);
                    for (i, a1) in u.alternatives.iter().enumerate() {
                        for a2 in &u.alternatives[..i] {
                            if a1.name == a2.name {
                                errs.push(Error::at(
                                    a1.info.clone(),
                                    ErrorKind::DuplicateAlternative { name: a1.name.clone(), previous: a2.info.clone() },
                                ));
                            }
                        }
                        for field in &a1.fields {
                            self.validate_type(&u.args, field, &mut errs);
                        }
                    }
                }
                TypeDecl::Alias(a) => {
                    self.validate_args(&a.info, &a.args, &mut errs);
                    self.validate_type(&a.args, &a.ty, &mut errs);
                }
            }
        }

        if let Err(e) = self.check_alias_cycles() {
            errs.push(e);
        }

        for (name, impls) in &self.funcs {
            for (i, imp) in impls.iter().enumerate() {
                let free = free_vars(imp.ty());
                self.validate_type(&free.in_order(), imp.ty(), &mut errs);
                for other in &impls[..i] {
                    if can_unify(&self.names, imp.ty(), other.ty()) {
                        errs.push(Error::at(
                            imp.info().clone(),
                            ErrorKind::DuplicateSignature { name: name.clone(), previous: Some(other.info().clone()) },
                        ));
                    }
                }
            }
        }

        errs
    }

    fn validate_args(&self, info: &SourceInfo, args: &[Name], errs: &mut Vec<Error>) {
        for (i, a1) in args.iter().enumerate() {
            if args[..i].contains(a1) {
                errs.push(Error::at(info.clone(), ErrorKind::DuplicateTypeArgument(a1.clone())));
            }
        }
    }

    fn validate_type(&self, bound: &[Name], ty: &Type, errs: &mut Vec<Error>) {
        match ty {
            Type::Var(v) => {
                if !bound.contains(v) {
                    errs.push(Error::without_source(ErrorKind::UnboundTypeVariable(v.clone())));
                }
            }
            Type::Appl(name, args) => {
                match self.names.get(name) {
                    None => errs.push(Error::without_source(ErrorKind::UnknownTypeName(name.clone()))),
                    Some(decl) => {
                        if decl.arity() != args.len() {
                            errs.push(Error::without_source(ErrorKind::ArityMismatch {
                                name: name.clone(),
                                expected: decl.arity(),
                                found: args.len(),
                            }));
                        }
                    }
                }
                for arg in args {
                    self.validate_type(bound, arg, errs);
                }
            }
            Type::Func(from, to) => {
                self.validate_type(bound, from, errs);
                self.validate_type(bound, to, errs);
            }
        }
    }

    /// Detects a cycle in the alias-expansion graph (two aliases that
    /// transitively refer to each other), which would otherwise make
    /// unification's alias-expansion step diverge.
    fn check_alias_cycles(&self) -> Result<(), Error> {
        let aliases: Vec<&Name> = self
            .names
            .iter()
            .filter_map(|(n, d)| matches!(d, TypeDecl::Alias(_)).then_some(n))
            .collect();
        for start in aliases {
            let mut stack = Vec::new();
            if let Some(cycle) = self.find_alias_cycle(start, &mut stack) {
                return Err(Error::without_source(ErrorKind::CyclicAlias(cycle)));
            }
        }
        Ok(())
    }

    fn find_alias_cycle(&self, name: &Name, stack: &mut Vec<Name>) -> Option<Vec<Name>> {
        if stack.contains(name) {
            stack.push(name.clone());
            return Some(stack.clone());
        }
        let Some(TypeDecl::Alias(alias)) = self.names.get(name) else {
            return None;
        };
        stack.push(name.clone());
        let result = referenced_type_names(&alias.ty)
            .into_iter()
            .find_map(|referenced| self.find_alias_cycle(&referenced, stack));
        stack.pop();
        result
    }

    /// Runs the type inferencer over every source-backed function
    /// implementation, replacing its body with the rewritten,
    /// fully-typed expression the inferencer settles on.
    pub fn type_infer(&mut self) -> Vec<Error> {
        let mut errs = Vec::new();
        let global: HashMap<Name, Vec<Type>> = self
            .funcs
            .iter()
            .map(|(name, impls)| (name.clone(), impls.iter().map(|i| i.ty().clone()).collect()))
            .collect();

        for impls in self.funcs.values_mut() {
            for imp in impls.iter_mut() {
                let FuncImpl::Source { info, ty, body } = imp else { continue };
                match infer(&self.names, &global, body) {
                    Err(e) => errs.push(e),
                    Ok(results) => {
                        let admissible: Vec<_> = results
                            .into_iter()
                            .filter(|r| is_more_specific(ty, &r.ty) || unify(&self.names, ty, &r.ty).is_some())
                            .collect();
                        match admissible.len() {
                            0 => errs.push(Error::at(
                                info.clone(),
                                ErrorKind::NoMatch { inferred: body.type_info().unwrap_or_else(|| ty.clone()), annotation: ty.clone() },
                            )),
                            1 => {
                                *body = admissible[0].expr.clone();
                                debug!(function = %info, "inferred type for definition");
                            }
                            _ => errs.push(Error::at(
                                info.clone(),
                                ErrorKind::Ambiguous {
                                    witness: ambiguity_witness(&admissible[0].expr, &admissible[1].expr),
                                    candidates: admissible.iter().map(|r| r.ty.clone()).collect(),
                                },
                            )),
                        }
                    }
                }
            }
        }
        errs
    }
}

fn referenced_type_names(ty: &Type) -> Vec<Name> {
    let mut names = Vec::new();
    ty.map(&mut |t| {
        if let Type::Appl(name, _) = &t {
            names.push(name.clone());
        }
        t
    });
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_type_name() {
        let mut env = Env::new();
        let info = SourceInfo::new("t.cv".into(), 1, 1);
        env.add(Declaration::Alias(
            Name::new("X"),
            AliasDecl { info: info.clone(), args: vec![], ty: Type::nullary("Int") },
        ))
        .unwrap();
        let err = env
            .add(Declaration::Alias(
                Name::new("X"),
                AliasDecl { info, args: vec![], ty: Type::nullary("Int") },
            ))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateTypeName { .. }));
    }

    #[test]
    fn detects_cyclic_alias() {
        let mut env = Env::new();
        let info = SourceInfo::new("t.cv".into(), 1, 1);
        env.add(Declaration::Alias(
            Name::new("A"),
            AliasDecl { info: info.clone(), args: vec![], ty: Type::nullary("B") },
        ))
        .unwrap();
        env.add(Declaration::Alias(
            Name::new("B"),
            AliasDecl { info, args: vec![], ty: Type::nullary("A") },
        ))
        .unwrap();
        let errs = env.validate();
        assert!(errs.iter().any(|e| matches!(e.kind, ErrorKind::CyclicAlias(_))));
    }
}
