//! Built-in registry
//!
//! Static documentation for the Sass standard modules and the SassDoc annotations.
//! Members of `sass:*` modules are reachable through a `@use` namespace, and most of
//! them also through a legacy global name.

use crate::scss::constants::{BUILTIN_MODULE_PREFIX, SASSDOC_REFERENCE_URL, SASS_REFERENCE_URL};
use crate::scss::syntax::SymbolKind;

/// A function, mixin or variable of a Sass standard module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinMember {
    pub kind: SymbolKind,
    /// Module name without `sass:`
    pub module: &'static str,
    pub name: &'static str,
    /// Signature without the name, e.g. `($number)`
    pub signature: &'static str,
    pub description: &'static str,
    /// Legacy global name, e.g. `map-get` for `map.get`
    pub global: Option<&'static str>,
    /// Only available as a global function, not through the module
    pub global_only: bool,
}

impl BuiltinMember {
    /// Link to the member in the Sass documentation
    pub fn link(&self) -> String {
        format!("{}/{}#{}", SASS_REFERENCE_URL, self.module, self.name)
    }

    /// Parameters between the parentheses of the signature
    pub fn parameters(&self) -> Option<&'static str> {
        self.signature
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
    }

    pub fn display_name(&self) -> String {
        self.kind.display_name(self.name)
    }

    /// Text shown in completion details and signature help, e.g. `math.round($number)`
    pub fn label(&self) -> String {
        match self.kind {
            SymbolKind::Variable => format!("{}.${}", self.module, self.name),
            _ => format!("{}.{}{}", self.module, self.name, self.signature),
        }
    }
}

const fn function(
    module: &'static str,
    name: &'static str,
    signature: &'static str,
    description: &'static str,
    global: Option<&'static str>,
) -> BuiltinMember {
    BuiltinMember {
        kind: SymbolKind::Function,
        module,
        name,
        signature,
        description,
        global,
        global_only: false,
    }
}

const fn global_function(
    module: &'static str,
    name: &'static str,
    signature: &'static str,
    description: &'static str,
) -> BuiltinMember {
    BuiltinMember {
        kind: SymbolKind::Function,
        module,
        name,
        signature,
        description,
        global: Some(name),
        global_only: true,
    }
}

const fn variable(module: &'static str, name: &'static str, description: &'static str) -> BuiltinMember {
    BuiltinMember {
        kind: SymbolKind::Variable,
        module,
        name,
        signature: "",
        description,
        global: None,
        global_only: false,
    }
}

const fn mixin(
    module: &'static str,
    name: &'static str,
    signature: &'static str,
    description: &'static str,
) -> BuiltinMember {
    BuiltinMember {
        kind: SymbolKind::Mixin,
        module,
        name,
        signature,
        description,
        global: None,
        global_only: false,
    }
}

/// Names of the standard modules, in documentation order
pub const MODULES: &[&str] = &["math", "string", "color", "list", "map", "selector", "meta"];

static MEMBERS: &[BuiltinMember] = &[
    // sass:math
    variable("math", "e", "Equal to the value of the mathematical constant e."),
    variable("math", "pi", "Equal to the value of the mathematical constant π."),
    function("math", "ceil", "($number)", "Rounds $number up to the next highest whole number.", Some("ceil")),
    function("math", "clamp", "($min, $number, $max)", "Restricts $number to the range between $min and $max.", None),
    function("math", "floor", "($number)", "Rounds $number down to the next lowest whole number.", Some("floor")),
    function("math", "max", "($number...)", "Returns the highest of one or more numbers.", Some("max")),
    function("math", "min", "($number...)", "Returns the lowest of one or more numbers.", Some("min")),
    function("math", "round", "($number)", "Rounds $number to the nearest whole number.", Some("round")),
    function("math", "abs", "($number)", "Returns the absolute value of $number.", Some("abs")),
    function("math", "hypot", "($number...)", "Returns the length of the n-dimensional vector that has components equal to each $number.", None),
    function("math", "log", "($number, $base: null)", "Returns the logarithm of $number with respect to $base, or the natural logarithm without one.", None),
    function("math", "pow", "($base, $exponent)", "Raises $base to the power of $exponent.", None),
    function("math", "sqrt", "($number)", "Returns the square root of $number.", None),
    function("math", "cos", "($number)", "Returns the cosine of $number.", None),
    function("math", "sin", "($number)", "Returns the sine of $number.", None),
    function("math", "tan", "($number)", "Returns the tangent of $number.", None),
    function("math", "atan2", "($y, $x)", "Returns the 2-argument arctangent of $y and $x.", None),
    function("math", "compatible", "($number1, $number2)", "Returns whether $number1 and $number2 have compatible units.", Some("comparable")),
    function("math", "is-unitless", "($number)", "Returns whether $number has no units.", Some("unitless")),
    function("math", "unit", "($number)", "Returns a string representation of $number's units.", Some("unit")),
    function("math", "div", "($number1, $number2)", "Returns the result of dividing $number1 by $number2.", None),
    function("math", "percentage", "($number)", "Converts a unitless $number (usually a decimal between 0 and 1) to a percentage.", Some("percentage")),
    function("math", "random", "($limit: null)", "Returns a random decimal number between 0 and 1, or a whole number between 1 and $limit.", Some("random")),
    // sass:string
    function("string", "quote", "($string)", "Returns $string as a quoted string.", Some("quote")),
    function("string", "index", "($string, $substring)", "Returns the first index of $substring in $string, or null if $string doesn't contain $substring.", Some("str-index")),
    function("string", "insert", "($string, $insert, $index)", "Returns a copy of $string with $insert inserted at $index.", Some("str-insert")),
    function("string", "length", "($string)", "Returns the number of characters in $string.", Some("str-length")),
    function("string", "slice", "($string, $start-at, $end-at: -1)", "Returns the slice of $string starting at index $start-at and ending at index $end-at (both inclusive).", Some("str-slice")),
    function("string", "split", "($string, $separator, $limit: null)", "Returns a bracketed, comma-separated list of substrings of $string that are separated by $separator.", None),
    function("string", "to-upper-case", "($string)", "Returns a copy of $string with the ASCII letters converted to upper case.", Some("to-upper-case")),
    function("string", "to-lower-case", "($string)", "Returns a copy of $string with the ASCII letters converted to lower case.", Some("to-lower-case")),
    function("string", "unique-id", "()", "Returns a randomly-generated unquoted string that's guaranteed to be a valid CSS identifier and to be unique within the current Sass compilation.", Some("unique-id")),
    function("string", "unquote", "($string)", "Returns $string as an unquoted string.", Some("unquote")),
    // sass:color
    function("color", "adjust", "($color, $red: null, $green: null, $blue: null, $hue: null, $saturation: null, $lightness: null, $alpha: null)", "Increases or decreases one or more properties of $color by fixed amounts.", Some("adjust-color")),
    function("color", "change", "($color, $red: null, $green: null, $blue: null, $hue: null, $saturation: null, $lightness: null, $alpha: null)", "Sets one or more properties of a color to new values.", Some("change-color")),
    function("color", "scale", "($color, $red: null, $green: null, $blue: null, $saturation: null, $lightness: null, $alpha: null)", "Fluidly scales one or more properties of $color.", Some("scale-color")),
    function("color", "mix", "($color1, $color2, $weight: 50%)", "Returns a color that's a mixture of $color1 and $color2.", Some("mix")),
    function("color", "complement", "($color)", "Returns the RGB complement of $color.", Some("complement")),
    function("color", "grayscale", "($color)", "Returns a gray color with the same lightness as $color.", Some("grayscale")),
    function("color", "invert", "($color, $weight: 100%)", "Returns the inverse or negative of $color.", Some("invert")),
    function("color", "alpha", "($color)", "Returns the alpha channel of $color as a number between 0 and 1.", Some("alpha")),
    function("color", "red", "($color)", "Returns the red channel of $color as a number between 0 and 255.", Some("red")),
    function("color", "green", "($color)", "Returns the green channel of $color as a number between 0 and 255.", Some("green")),
    function("color", "blue", "($color)", "Returns the blue channel of $color as a number between 0 and 255.", Some("blue")),
    function("color", "hue", "($color)", "Returns the hue of $color as a number between 0deg and 360deg.", Some("hue")),
    function("color", "saturation", "($color)", "Returns the HSL saturation of $color as a number between 0% and 100%.", Some("saturation")),
    function("color", "lightness", "($color)", "Returns the HSL lightness of $color as a number between 0% and 100%.", Some("lightness")),
    function("color", "ie-hex-str", "($color)", "Returns an unquoted string that represents $color in the #AARRGGBB format.", Some("ie-hex-str")),
    global_function("color", "rgba", "($red, $green, $blue, $alpha)", "Returns a color with the given red, green, blue and alpha channels."),
    global_function("color", "lighten", "($color, $amount)", "Makes $color lighter."),
    global_function("color", "darken", "($color, $amount)", "Makes $color darker."),
    global_function("color", "saturate", "($color, $amount)", "Makes $color more saturated."),
    global_function("color", "desaturate", "($color, $amount)", "Makes $color less saturated."),
    global_function("color", "opacify", "($color, $amount)", "Makes $color more opaque."),
    global_function("color", "transparentize", "($color, $amount)", "Makes $color more transparent."),
    global_function("color", "adjust-hue", "($color, $degrees)", "Increases or decreases $color's hue."),
    // sass:list
    function("list", "append", "($list, $val, $separator: auto)", "Returns a copy of $list with $val added to the end.", Some("append")),
    function("list", "index", "($list, $value)", "Returns the index of $value in $list.", Some("index")),
    function("list", "is-bracketed", "($list)", "Returns whether $list has square brackets.", Some("is-bracketed")),
    function("list", "join", "($list1, $list2, $separator: auto, $bracketed: auto)", "Returns a new list containing the elements of $list1 followed by the elements of $list2.", Some("join")),
    function("list", "length", "($list)", "Returns the length of $list.", Some("length")),
    function("list", "separator", "($list)", "Returns the name of the separator used by $list.", Some("list-separator")),
    function("list", "nth", "($list, $n)", "Returns the element of $list at index $n.", Some("nth")),
    function("list", "set-nth", "($list, $n, $value)", "Returns a copy of $list with the element at index $n replaced with $value.", Some("set-nth")),
    function("list", "slash", "($elements...)", "Returns a slash-separated list that contains $elements.", None),
    function("list", "zip", "($lists...)", "Combines every list in $lists into a single list of sub-lists.", Some("zip")),
    // sass:map
    function("map", "deep-merge", "($map1, $map2)", "Identical to map.merge(), except that nested map values are also recursively merged.", None),
    function("map", "deep-remove", "($map, $key, $keys...)", "Returns a copy of $map without the value associated with the nested $keys.", None),
    function("map", "get", "($map, $key, $keys...)", "Returns the value in $map associated with $key.", Some("map-get")),
    function("map", "has-key", "($map, $key, $keys...)", "Returns whether $map contains a value associated with $key.", Some("map-has-key")),
    function("map", "keys", "($map)", "Returns a comma-separated list of all the keys in $map.", Some("map-keys")),
    function("map", "merge", "($map1, $map2)", "Returns a new map with all the keys and values from both $map1 and $map2.", Some("map-merge")),
    function("map", "remove", "($map, $keys...)", "Returns a copy of $map without any values associated with $keys.", Some("map-remove")),
    function("map", "set", "($map, $key, $value)", "Returns a copy of $map with the value at $key set to $value.", None),
    function("map", "values", "($map)", "Returns a comma-separated list of all the values in $map.", Some("map-values")),
    // sass:selector
    function("selector", "is-superselector", "($super, $sub)", "Returns whether the selector $super matches all the elements that the selector $sub matches.", Some("is-superselector")),
    function("selector", "append", "($selectors...)", "Combines $selectors without descendant combinators between them.", Some("selector-append")),
    function("selector", "extend", "($selector, $extendee, $extender)", "Extends $selector as with the @extend rule.", Some("selector-extend")),
    function("selector", "nest", "($selectors...)", "Combines $selectors as though they were nested within one another in the stylesheet.", Some("selector-nest")),
    function("selector", "parse", "($selector)", "Returns $selector in the selector value format.", Some("selector-parse")),
    function("selector", "replace", "($selector, $original, $replacement)", "Returns a copy of $selector with all instances of $original replaced by $replacement.", Some("selector-replace")),
    function("selector", "unify", "($selector1, $selector2)", "Returns a selector that matches only elements matched by both $selector1 and $selector2.", Some("selector-unify")),
    function("selector", "simple-selectors", "($selector)", "Returns a list of simple selectors in $selector.", Some("simple-selectors")),
    // sass:meta
    mixin("meta", "load-css", "($url, $with: null)", "Loads the module at $url and includes its CSS as though it were written as the contents of this mixin."),
    function("meta", "call", "($function, $args...)", "Invokes $function with $args and returns the result.", Some("call")),
    function("meta", "content-exists", "()", "Returns whether the current mixin was passed a @content block.", Some("content-exists")),
    function("meta", "feature-exists", "($feature)", "Returns whether the current Sass implementation supports $feature.", Some("feature-exists")),
    function("meta", "function-exists", "($name, $module: null)", "Returns whether a function named $name is defined.", Some("function-exists")),
    function("meta", "get-function", "($name, $css: false, $module: null)", "Returns the function value named $name.", Some("get-function")),
    function("meta", "global-variable-exists", "($name, $module: null)", "Returns whether a global variable named $name exists.", Some("global-variable-exists")),
    function("meta", "inspect", "($value)", "Returns a string representation of $value.", Some("inspect")),
    function("meta", "keywords", "($args)", "Returns the keywords passed to a mixin or function that takes arbitrary arguments.", Some("keywords")),
    function("meta", "mixin-exists", "($name, $module: null)", "Returns whether a mixin named $name exists.", Some("mixin-exists")),
    function("meta", "module-functions", "($module)", "Returns all the functions defined in a module, as a map from function names to function values.", None),
    function("meta", "module-variables", "($module)", "Returns all the variables defined in a module, as a map from variable names to their values.", None),
    function("meta", "type-of", "($value)", "Returns the type of $value.", Some("type-of")),
    function("meta", "variable-exists", "($name)", "Returns whether a variable named $name exists in the current scope.", Some("variable-exists")),
];

/// Every registered member
pub fn members() -> &'static [BuiltinMember] {
    MEMBERS
}

pub fn is_known_module(module: &str) -> bool {
    MODULES.contains(&module)
}

/// Member of `sass:<module>` reachable through a namespace
pub fn lookup(module: &str, kind: SymbolKind, name: &str) -> Option<&'static BuiltinMember> {
    MEMBERS
        .iter()
        .find(|m| !m.global_only && m.module == module && m.kind == kind && m.name == name)
}

/// Member reachable through its legacy global name
pub fn lookup_global(kind: SymbolKind, name: &str) -> Option<&'static BuiltinMember> {
    MEMBERS
        .iter()
        .find(|m| m.kind == kind && m.global == Some(name))
}

/// Members of `sass:<module>` reachable through a namespace
pub fn module_members(module: &str) -> impl Iterator<Item = &'static BuiltinMember> + '_ {
    MEMBERS
        .iter()
        .filter(move |m| !m.global_only && m.module == module)
}

/// Members with a legacy global name
pub fn global_members() -> impl Iterator<Item = &'static BuiltinMember> {
    MEMBERS.iter().filter(|m| m.global.is_some())
}

/// Link written in `@use` for a standard module
pub fn module_link(module: &str) -> String {
    format!("{}{}", BUILTIN_MODULE_PREFIX, module)
}

/// A SassDoc annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SassDocAnnotation {
    pub name: &'static str,
    /// Other spellings of the annotation
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

impl SassDocAnnotation {
    pub fn link(&self) -> String {
        format!("{}{}", SASSDOC_REFERENCE_URL, self.name)
    }
}

const fn annotation(
    name: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
) -> SassDocAnnotation {
    SassDocAnnotation {
        name,
        aliases,
        description,
    }
}

static ANNOTATIONS: &[SassDocAnnotation] = &[
    annotation("access", &[], "Access of the documented item, public or private."),
    annotation("alias", &[], "The item is an alias of another item."),
    annotation("author", &[], "Author of the documented item."),
    annotation("content", &[], "Describes the usage of @content in a mixin."),
    annotation("deprecated", &[], "The item is deprecated."),
    annotation("example", &[], "Example of how to use the documented item."),
    annotation("group", &[], "Group the documented item belongs to."),
    annotation("ignore", &[], "Line ignored by the documentation."),
    annotation("link", &["source"], "Link related to the documented item."),
    annotation("name", &[], "Name of the documented item."),
    annotation("output", &["outputs"], "Describes the output of a mixin."),
    annotation("parameter", &["param", "arg", "argument"], "Describes a parameter of a function or mixin."),
    annotation("property", &["prop"], "Describes a key of a documented map."),
    annotation("require", &["requires"], "Names requirements of the documented item."),
    annotation("return", &["returns"], "Describes the return value of a function."),
    annotation("see", &[], "Refers to another documented item."),
    annotation("since", &[], "Version the item was introduced in."),
    annotation("throw", &["throws", "exception"], "Describes an error the item can throw."),
    annotation("todo", &[], "Something left to do on the documented item."),
    annotation("type", &[], "Type of the documented variable."),
];

pub fn annotations() -> &'static [SassDocAnnotation] {
    ANNOTATIONS
}

/// Annotation by name or alias, without the `@`
pub fn lookup_annotation(name: &str) -> Option<&'static SassDocAnnotation> {
    ANNOTATIONS
        .iter()
        .find(|a| a.name == name || a.aliases.contains(&name))
}
