//! Builtin function declarations.
//!
//! One bodiless declaration per primitive operator and coercion, written as
//! ordinary source text and fed through the regular lexer and parser ahead
//! of user code. They take the ordinary function-table lookup path with no
//! special casing, and, being inserted first, reserve their signatures
//! against user redefinition.

use minoc_par::ast::Program;
use minoc_par::ParseError;
use minoc_util::Handler;

/// Source text of the builtin declarations.
pub const SOURCE: &str = "\
    int  operator+  (int x, int y);   int  operator-  (int x, int y); \
    int  operator*  (int x, int y);   int  operator/  (int x, int y); \
    int  operator%  (int x, int y); \
    bool operator== (int x, int y);   bool operator!= (int x, int y); \
    bool operator== (bool x, bool y); bool operator!= (bool x, bool y); \
    bool operator<  (int x, int y);   bool operator<= (int x, int y); \
    bool operator>  (int x, int y);   bool operator>= (int x, int y); \
    bool operator!  (bool x);         int  operator-  (int x); \
    bool operator&& (bool x, bool y); bool operator|| (bool x, bool y); \
    bool operator bool (int x);       int  operator int  (bool x); ";

/// Parse the builtin declarations into the front of `program`.
pub fn install(program: &mut Program) -> Result<(), ParseError> {
    let handler = Handler::new();
    let tokens = minoc_lex::tokenize(SOURCE, &handler);
    minoc_par::parse_into(program, &tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minoc_par::ast::Type;

    #[test]
    fn builtins_parse_as_bodiless_declarations() {
        let mut program = Program::new();
        install(&mut program).unwrap();
        assert_eq!(program.funcs.len(), 19);
        assert!(program.funcs.iter().all(|f| f.is_builtin()));
    }

    #[test]
    fn equality_is_declared_for_both_types() {
        let mut program = Program::new();
        install(&mut program).unwrap();
        let eqs: Vec<_> = program
            .funcs
            .iter()
            .filter(|f| f.name.as_str() == "==")
            .collect();
        assert_eq!(eqs.len(), 2);
        assert_eq!(eqs[0].params()[0].ty, Type::Int);
        assert_eq!(eqs[1].params()[0].ty, Type::Bool);
    }

    #[test]
    fn minus_has_binary_and_unary_forms() {
        let mut program = Program::new();
        install(&mut program).unwrap();
        let arities: Vec<_> = program
            .funcs
            .iter()
            .filter(|f| f.name.as_str() == "-")
            .map(|f| f.param_count)
            .collect();
        assert_eq!(arities, vec![2, 1]);
    }

    #[test]
    fn coercions_bridge_the_two_types() {
        let mut program = Program::new();
        install(&mut program).unwrap();
        let to_bool = program
            .funcs
            .iter()
            .find(|f| f.name.as_str() == "bool")
            .unwrap();
        assert_eq!(to_bool.params()[0].ty, Type::Int);
        assert_eq!(to_bool.ret, Type::Bool);
        let to_int = program
            .funcs
            .iter()
            .find(|f| f.name.as_str() == "int")
            .unwrap();
        assert_eq!(to_int.params()[0].ty, Type::Bool);
        assert_eq!(to_int.ret, Type::Int);
    }
}
